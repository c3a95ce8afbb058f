use std::collections::HashMap;

use cucumber::World;
use daan_engine::{
    events::EventProducers,
    settlement_objects::{DonationOrder, SettlementConfig},
    test_utils::{
        prepare_env::{create_database, random_db_path, run_migrations},
        FakeGateway,
    },
    SettlementApi,
    SettlementError,
    SqliteDatabase,
};
use log::*;

#[derive(Default, Debug, World)]
pub struct SettlementWorld {
    pub system: Option<SettlementSystem>,
    /// Organizations and events by the names used in the feature files
    pub organizations: HashMap<String, i64>,
    pub events: HashMap<String, i64>,
    pub last_order: Option<DonationOrder>,
    pub last_error: Option<SettlementError>,
}

pub struct SettlementSystem {
    pub db_path: String,
    pub gateway: FakeGateway,
    pub api: SettlementApi<SqliteDatabase, FakeGateway>,
}

impl std::fmt::Debug for SettlementSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettlementSystem ({})", self.db_path)
    }
}

impl SettlementWorld {
    pub fn system(&self) -> &SettlementSystem {
        self.system.as_ref().expect("SettlementSystem not initialised")
    }

    pub fn api(&self) -> &SettlementApi<SqliteDatabase, FakeGateway> {
        &self.system().api
    }

    pub fn db(&self) -> &SqliteDatabase {
        self.api().db()
    }

    pub fn org_id(&self, name: &str) -> i64 {
        *self.organizations.get(name).unwrap_or_else(|| panic!("No organization named {name}"))
    }

    pub fn event_id(&self, name: &str) -> i64 {
        *self.events.get(name).unwrap_or_else(|| panic!("No event named {name}"))
    }

    pub fn last_order(&self) -> &DonationOrder {
        self.last_order.as_ref().expect("No order has been created")
    }
}

impl SettlementSystem {
    pub async fn new() -> Self {
        let db_path = random_db_path();
        create_database(&db_path).await;
        run_migrations(&db_path).await;
        let db = SqliteDatabase::new_with_url(&db_path, 5).await.expect("Error creating connection to database");
        debug!("Created database: {db_path}");
        let gateway = FakeGateway::default();
        let api = SettlementApi::new(db, gateway.clone(), SettlementConfig::default(), EventProducers::default());
        Self { db_path, gateway, api }
    }
}
