//! Daan Engine
//!
//! The Daan engine settles donations made by devotees to religious organizations through an external payment gateway.
//! This library contains the core logic. It is gateway-agnostic and storage-agnostic.
//!
//! The library is divided into three main sections:
//! 1. Storage contracts ([`mod@traits`]). The [`DonationLedger`] owns the donation state machine, the [`EventFunding`]
//!    aggregator owns event fundraising totals, and [`DirectoryManagement`] covers organizations, events and
//!    favorites. [`SqliteDatabase`] implements all of them. The data types used in the database are defined in the
//!    [`mod@db_types`] module and are public.
//! 2. The payment gateway contract ([`PaymentGateway`]). The engine never talks to the network directly.
//! 3. The public API ([`SettlementApi`] and [`DirectoryApi`]). This is what the outer application calls to create
//!    donation orders, verify payments and apply gateway notifications.
//!
//! The engine also emits events ([`mod@events`]) when donations are captured or fail, so that other components can
//! react without coupling to the settlement flow.
mod daan_api;

pub mod db_types;
pub mod events;
pub mod helpers;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(feature = "test_utils")]
pub mod test_utils;

pub use daan_api::{
    directory_api::DirectoryApi,
    errors::{PolicyViolation, SettlementError},
    settlement_api::SettlementApi,
    settlement_objects,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{DirectoryManagement, DonationDatabase, DonationLedger, EventFunding, PaymentGateway};
