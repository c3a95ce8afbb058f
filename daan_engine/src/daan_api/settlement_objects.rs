use std::time::Duration;

use daan_common::CURRENCY_CODE;
use serde::{Deserialize, Serialize};

use crate::db_types::{Event, GatewayOrderId, MinorUnits, PaymentEnrichment};

pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementConfig {
    /// Smallest accepted donation. Defaults to one major unit.
    pub min_donation: MinorUnits,
    pub max_donation: MinorUnits,
    pub currency: String,
    /// Upper bound on every call to the payment gateway
    pub gateway_timeout: Duration,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            min_donation: MinorUnits::from_major(1),
            max_donation: MinorUnits::from_major(1_000_000),
            currency: CURRENCY_CODE.to_string(),
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

/// Everything the client needs to complete payment with the gateway's checkout SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationOrder {
    pub donation_id: i64,
    pub order_id: GatewayOrderId,
    pub amount: MinorUnits,
    /// The amount in major units, e.g. "500.00"
    pub amount_major: String,
    pub currency: String,
    pub receipt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Captured,
    Failed,
}

/// An authenticated push notification from the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayNotification {
    pub kind: NotificationKind,
    pub order_id: GatewayOrderId,
    pub payment_id: String,
    /// The webhook signature that authenticated this notification
    pub signature: String,
    pub amount: Option<MinorUnits>,
    pub enrichment: PaymentEnrichment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventProgress {
    pub event: Event,
    pub raised: MinorUnits,
    pub target: Option<MinorUnits>,
    /// Two-decimal percentage of the target raised so far. `None` when the event has no target.
    pub percent_funded: Option<String>,
}
