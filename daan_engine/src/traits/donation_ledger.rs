use thiserror::Error;

use crate::{
    db_types::{CaptureDetails, Donation, DonationStatus, GatewayOrderId, NewDonation},
    traits::data_objects::{CaptureResult, DonationPage, DonationStats, Pagination},
};

/// The donation ledger owns the lifecycle of a donation row.
///
/// A donation starts out `Pending` and moves exactly once, to either `Captured` or `Failed`. Both terminal states are
/// final. Backends must serialise state transitions at the storage layer, since several service instances may be
/// settling the same donation at the same time.
#[allow(async_fn_in_trait)]
pub trait DonationLedger {
    /// Stores a new donation in the `Pending` state.
    ///
    /// The caller is responsible for checking that the organization is one of the devotee's favorites, and that the
    /// event (if any) belongs to the organization and is active.
    ///
    /// Fails with [`LedgerError::DuplicateGatewayOrder`] if a donation already exists for the gateway order.
    async fn open_donation(&self, donation: NewDonation) -> Result<Donation, LedgerError>;

    async fn fetch_donation(&self, id: i64) -> Result<Option<Donation>, LedgerError>;

    /// Fetches the donation for the gateway order, but only if it belongs to `devotee_id`.
    async fn fetch_donation_for_order(
        &self,
        order_id: &GatewayOrderId,
        devotee_id: i64,
    ) -> Result<Option<Donation>, LedgerError>;

    /// Fetches the donation for the gateway order regardless of owner. Only for authenticated gateway notifications.
    async fn fetch_donation_by_gateway_order(&self, order_id: &GatewayOrderId) -> Result<Option<Donation>, LedgerError>;

    /// Captures the donation and, in the same atomic transaction, credits the amount to the donation's event.
    ///
    /// * A `Pending` donation is moved to `Captured`, with the payment id, signature and enrichment details recorded.
    ///   If the donation has an event, the event's raised total is incremented atomically. If the event has vanished
    ///   or is inactive, the credit is skipped but the capture still succeeds.
    /// * An already `Captured` donation is returned unchanged, with `newly_captured` set to false. Nothing is credited.
    /// * A `Failed` donation cannot be captured, and [`LedgerError::InvalidState`] is returned.
    async fn capture_donation(&self, id: i64, details: CaptureDetails) -> Result<CaptureResult, LedgerError>;

    /// Moves a `Pending` donation to `Failed`.
    ///
    /// Marking an already failed donation is a no-op, and the second element of the result is `false`.
    /// A captured donation can never fail, and [`LedgerError::InvalidState`] is returned.
    async fn mark_donation_failed(&self, id: i64) -> Result<(Donation, bool), LedgerError>;

    /// Returns a page of the devotee's donations, newest first.
    async fn fetch_donations_for_devotee(
        &self,
        devotee_id: i64,
        page: Pagination,
    ) -> Result<DonationPage, LedgerError>;

    async fn fetch_donation_stats(&self, devotee_id: i64) -> Result<DonationStats, LedgerError>;
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Donation {0} does not exist")]
    DonationNotFound(i64),
    #[error("A donation already exists for gateway order {0}")]
    DuplicateGatewayOrder(GatewayOrderId),
    #[error("Donation {id} is {status} and cannot be moved to {requested}")]
    InvalidState { id: i64, status: DonationStatus, requested: DonationStatus },
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}
