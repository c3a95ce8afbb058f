use crate::{
    db_types::{Event, MinorUnits},
    traits::{data_objects::FundingOutcome, DirectoryError},
};

/// The event funding aggregator is the only writer of an event's raised total.
#[allow(async_fn_in_trait)]
pub trait EventFunding {
    async fn fetch_event(&self, event_id: i64) -> Result<Option<Event>, DirectoryError>;

    /// Adds `amount` to the event's raised total in a single atomic statement.
    ///
    /// Concurrent calls never lose updates. If the event does not exist or is inactive, nothing is written and
    /// [`FundingOutcome::Skipped`] is returned. Non-positive amounts are rejected with
    /// [`DirectoryError::InvalidAmount`], so the total can never decrease.
    async fn add_raised(&self, event_id: i64, amount: MinorUnits) -> Result<FundingOutcome, DirectoryError>;
}
