//! `SqliteDatabase` is a concrete implementation of a Daan engine backend.
//!
//! It uses SQLite as the backend and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{db_url, donations, events, favorites, is_unique_violation, new_pool, organizations};
use crate::{
    db_types::{
        CaptureDetails,
        Donation,
        DonationStatus,
        Event,
        Favorite,
        GatewayOrderId,
        MinorUnits,
        NewDonation,
        NewEvent,
        NewOrganization,
        Organization,
    },
    traits::{
        CaptureResult,
        DirectoryError,
        DirectoryManagement,
        DonationDatabase,
        DonationLedger,
        DonationPage,
        DonationStats,
        EventFunding,
        FundingOutcome,
        LedgerError,
        Pagination,
        MAX_FAVORITES,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl DonationDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}

impl DonationLedger for SqliteDatabase {
    async fn open_donation(&self, donation: NewDonation) -> Result<Donation, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        donations::insert_donation(donation, &mut conn).await
    }

    async fn fetch_donation(&self, id: i64) -> Result<Option<Donation>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let donation = donations::fetch_donation(id, &mut conn).await?;
        Ok(donation)
    }

    async fn fetch_donation_for_order(
        &self,
        order_id: &GatewayOrderId,
        devotee_id: i64,
    ) -> Result<Option<Donation>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let donation = donations::fetch_donation_for_order(order_id, devotee_id, &mut conn).await?;
        Ok(donation)
    }

    async fn fetch_donation_by_gateway_order(&self, order_id: &GatewayOrderId) -> Result<Option<Donation>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let donation = donations::fetch_donation_by_gateway_order(order_id, &mut conn).await?;
        Ok(donation)
    }

    /// In a single atomic transaction,
    /// * moves the donation from `pending` to `captured` with a conditional update,
    /// * if that changed the row, and the donation has an event, adds the amount to the event's raised total.
    ///
    /// The conditional update is the first statement in the transaction, so concurrent captures queue up on the write
    /// lock rather than racing on a stale read. A second capture of the same donation finds nothing to update and
    /// reports a replay.
    async fn capture_donation(&self, id: i64, details: CaptureDetails) -> Result<CaptureResult, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let Some(donation) = donations::try_capture(id, &details, &mut tx).await? else {
            let existing = donations::fetch_donation(id, &mut tx).await?;
            tx.commit().await?;
            return match existing {
                None => Err(LedgerError::DonationNotFound(id)),
                Some(d) if d.status == DonationStatus::Captured => {
                    debug!("🗃️ Donation #{id} was already captured. Nothing to do.");
                    Ok(CaptureResult::replay(d))
                },
                Some(d) => Err(LedgerError::InvalidState { id, status: d.status, requested: DonationStatus::Captured }),
            };
        };
        let funding = match donation.event_id {
            None => FundingOutcome::NotApplicable,
            Some(event_id) => match events::add_raised(event_id, donation.amount, &mut tx).await? {
                Some(event) => {
                    debug!("🗃️ Event #{event_id} credited with {}. Raised so far: {}", donation.amount, event.raised_amount);
                    FundingOutcome::Credited(event)
                },
                None => {
                    warn!(
                        "🗃️ Donation #{id} was captured for event #{event_id}, but the event is missing or inactive. \
                         The event total was not updated."
                    );
                    FundingOutcome::Skipped(event_id)
                },
            },
        };
        tx.commit().await?;
        debug!("🗃️ Donation #{id} captured with payment {}", details.payment_id);
        Ok(CaptureResult { donation, newly_captured: true, funding })
    }

    async fn mark_donation_failed(&self, id: i64) -> Result<(Donation, bool), LedgerError> {
        let mut tx = self.pool.begin().await?;
        if let Some(donation) = donations::try_mark_failed(id, &mut tx).await? {
            tx.commit().await?;
            debug!("🗃️ Donation #{id} marked as failed");
            return Ok((donation, true));
        }
        let existing = donations::fetch_donation(id, &mut tx).await?;
        tx.commit().await?;
        match existing {
            None => Err(LedgerError::DonationNotFound(id)),
            Some(d) if d.status == DonationStatus::Failed => Ok((d, false)),
            Some(d) => Err(LedgerError::InvalidState { id, status: d.status, requested: DonationStatus::Failed }),
        }
    }

    async fn fetch_donations_for_devotee(
        &self,
        devotee_id: i64,
        page: Pagination,
    ) -> Result<DonationPage, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let total = donations::count_donations_for_devotee(devotee_id, &mut conn).await?;
        let donations = donations::fetch_donations_for_devotee(devotee_id, page, &mut conn).await?;
        Ok(DonationPage { donations, page: page.page(), limit: page.limit(), total })
    }

    async fn fetch_donation_stats(&self, devotee_id: i64) -> Result<DonationStats, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let stats = donations::donation_stats(devotee_id, &mut conn).await?;
        Ok(stats)
    }
}

impl EventFunding for SqliteDatabase {
    async fn fetch_event(&self, event_id: i64) -> Result<Option<Event>, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        let event = events::fetch_event(event_id, &mut conn).await?;
        Ok(event)
    }

    async fn add_raised(&self, event_id: i64, amount: MinorUnits) -> Result<FundingOutcome, DirectoryError> {
        if !amount.is_positive() {
            return Err(DirectoryError::InvalidAmount(amount));
        }
        let mut conn = self.pool.acquire().await?;
        let outcome = match events::add_raised(event_id, amount, &mut conn).await? {
            Some(event) => FundingOutcome::Credited(event),
            None => {
                warn!("🗃️ Tried to credit {amount} to event #{event_id}, but it is missing or inactive");
                FundingOutcome::Skipped(event_id)
            },
        };
        Ok(outcome)
    }
}

impl DirectoryManagement for SqliteDatabase {
    async fn insert_organization(&self, org: NewOrganization) -> Result<Organization, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        let org = organizations::insert_organization(org, &mut conn).await?;
        Ok(org)
    }

    async fn fetch_organization(&self, id: i64) -> Result<Option<Organization>, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        let org = organizations::fetch_organization(id, &mut conn).await?;
        Ok(org)
    }

    async fn set_organization_active(&self, id: i64, active: bool) -> Result<Organization, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        organizations::set_organization_active(id, active, &mut conn)
            .await?
            .ok_or(DirectoryError::OrganizationNotFound(id))
    }

    async fn insert_event(&self, event: NewEvent) -> Result<Event, DirectoryError> {
        event.validate().map_err(DirectoryError::InvalidEvent)?;
        let mut conn = self.pool.acquire().await?;
        if organizations::fetch_organization(event.organization_id, &mut conn).await?.is_none() {
            return Err(DirectoryError::OrganizationNotFound(event.organization_id));
        }
        let event = events::insert_event(event, &mut conn).await?;
        Ok(event)
    }

    async fn set_event_active(&self, id: i64, active: bool) -> Result<Event, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        events::set_event_active(id, active, &mut conn).await?.ok_or(DirectoryError::EventNotFound(id))
    }

    async fn fetch_events_for_organization(&self, org_id: i64) -> Result<Vec<Event>, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        let events = events::fetch_events_for_organization(org_id, &mut conn).await?;
        Ok(events)
    }

    async fn is_favorite(&self, devotee_id: i64, org_id: i64) -> Result<bool, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        let result = favorites::is_favorite(devotee_id, org_id, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_favorites(&self, devotee_id: i64) -> Result<Vec<Favorite>, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        let result = favorites::fetch_favorites(devotee_id, &mut conn).await?;
        Ok(result)
    }

    async fn add_favorite(&self, devotee_id: i64, org_id: i64) -> Result<Favorite, DirectoryError> {
        let mut conn = self.pool.acquire().await?;
        if organizations::fetch_organization(org_id, &mut conn).await?.is_none() {
            return Err(DirectoryError::OrganizationNotFound(org_id));
        }
        match favorites::insert_favorite(devotee_id, org_id, MAX_FAVORITES, &mut conn).await {
            Ok(Some(favorite)) => {
                debug!("🗃️ Devotee {devotee_id} favorited organization #{org_id} at position {}", favorite.position);
                Ok(favorite)
            },
            Ok(None) => Err(DirectoryError::FavoritesLimitReached),
            Err(e) if is_unique_violation(&e) => Err(DirectoryError::AlreadyFavorited(org_id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_favorite(&self, devotee_id: i64, org_id: i64) -> Result<bool, DirectoryError> {
        let mut tx = self.pool.begin().await?;
        let Some(position) = favorites::delete_favorite(devotee_id, org_id, &mut tx).await? else {
            tx.commit().await?;
            return Ok(false);
        };
        favorites::close_gap(devotee_id, position, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Devotee {devotee_id} removed organization #{org_id} from favorites");
        Ok(true)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Applies the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
