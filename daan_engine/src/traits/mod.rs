//! # Storage and gateway contracts
//!
//! This module defines the interfaces that settlement backends must expose in order to be supported by the
//! Daan engine.
//!
//! * [`DonationLedger`] owns the donation state machine and the idempotent capture guarantee.
//! * [`EventFunding`] is the only writer of an event's raised total.
//! * [`DirectoryManagement`] covers organizations, events and devotee favorites.
//! * [`DonationDatabase`] ties the three together into a complete backend.
//! * [`PaymentGateway`] abstracts the external payment processor.
mod data_objects;
mod directory_management;
mod donation_ledger;
mod event_funding;
mod payment_gateway;

pub use data_objects::{
    CaptureResult,
    DonationPage,
    DonationStats,
    FundingOutcome,
    Pagination,
    DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use directory_management::{DirectoryError, DirectoryManagement, MAX_FAVORITES};
pub use donation_ledger::{DonationLedger, LedgerError};
pub use event_funding::EventFunding;
pub use payment_gateway::{GatewayError, GatewayOrder, PaymentGateway};

/// The highest level of behaviour for backends supporting the Daan engine.
#[allow(async_fn_in_trait)]
pub trait DonationDatabase: Clone + DonationLedger + EventFunding + DirectoryManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), LedgerError> {
        Ok(())
    }
}
