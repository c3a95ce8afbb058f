use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Donation, Event},
    traits::FundingOutcome,
};

/// Published exactly once, when a donation moves from `pending` to `captured`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationCapturedEvent {
    pub donation: Donation,
    /// The event after it was credited, if the donation targeted an active event
    pub credited_event: Option<Event>,
}

impl DonationCapturedEvent {
    pub fn new(donation: Donation, funding: &FundingOutcome) -> Self {
        let credited_event = match funding {
            FundingOutcome::Credited(event) => Some(event.clone()),
            _ => None,
        };
        Self { donation, credited_event }
    }
}

/// Published exactly once, when a donation moves from `pending` to `failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationFailedEvent {
    pub donation: Donation,
    pub reason: String,
}

impl DonationFailedEvent {
    pub fn new(donation: Donation, reason: &str) -> Self {
        Self { donation, reason: reason.to_string() }
    }
}
