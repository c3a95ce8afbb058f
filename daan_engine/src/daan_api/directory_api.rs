use std::fmt::Debug;

use log::*;

use crate::{
    daan_api::{errors::SettlementError, settlement_objects::EventProgress},
    db_types::Favorite,
    helpers::percent_funded,
    traits::{DirectoryManagement, EventFunding},
};

/// Devotee favorites and event fundraising progress.
pub struct DirectoryApi<B> {
    db: B,
}

impl<B> Debug for DirectoryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DirectoryApi")
    }
}

impl<B> DirectoryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> DirectoryApi<B>
where B: DirectoryManagement + EventFunding
{
    pub async fn favorites(&self, devotee_id: i64) -> Result<Vec<Favorite>, SettlementError> {
        let favorites = self.db.fetch_favorites(devotee_id).await?;
        Ok(favorites)
    }

    /// Only active organizations can be favorited.
    pub async fn add_favorite(&self, devotee_id: i64, org_id: i64) -> Result<Favorite, SettlementError> {
        match self.db.fetch_organization(org_id).await? {
            Some(org) if org.is_active => {},
            _ => return Err(SettlementError::NotFound(format!("Organization {org_id} was not found"))),
        }
        let favorite = self.db.add_favorite(devotee_id, org_id).await?;
        info!("💰️ Devotee {devotee_id} added organization #{org_id} to favorites");
        Ok(favorite)
    }

    pub async fn remove_favorite(&self, devotee_id: i64, org_id: i64) -> Result<(), SettlementError> {
        if self.db.remove_favorite(devotee_id, org_id).await? {
            info!("💰️ Devotee {devotee_id} removed organization #{org_id} from favorites");
            Ok(())
        } else {
            Err(SettlementError::NotFound(format!("Organization {org_id} is not a favorite")))
        }
    }

    pub async fn event_progress(&self, event_id: i64) -> Result<EventProgress, SettlementError> {
        let event = self
            .db
            .fetch_event(event_id)
            .await?
            .ok_or_else(|| SettlementError::NotFound(format!("Event {event_id} was not found")))?;
        let raised = event.raised_amount;
        let target = event.target_amount;
        let percent_funded = target.and_then(|t| percent_funded(raised.value(), t.value()));
        Ok(EventProgress { event, raised, target, percent_funded })
    }
}
