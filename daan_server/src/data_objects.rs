//! Request and response bodies for the HTTP API.
//!
//! Money always leaves the server as a major-unit decimal string with two fraction digits, e.g. `"500.00"`. The
//! exact minor-unit value is included wherever a client may need to hand it to the gateway's checkout SDK.
use std::fmt::Display;

use chrono::{DateTime, Utc};
use daan_engine::{
    db_types::{Donation, DonationStatus},
    settlement_objects::{DonationOrder, EventProgress},
    traits::{DonationPage, DonationStats},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The gateway's public key id, handed to clients so they can open the checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutKey(pub String);

/// A donation amount as sent by a client. Both `"250.50"` and `250.5` are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl Display for AmountInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmountInput::Text(s) => f.write_str(s),
            AmountInput::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub organization_id: i64,
    pub amount: AmountInput,
    #[serde(default)]
    pub event_id: Option<i64>,
}

/// The fields returned by the gateway's checkout SDK once the devotee has paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(alias = "razorpay_order_id")]
    pub order_id: String,
    #[serde(alias = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(alias = "razorpay_signature")]
    pub signature: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationOrderResponse {
    pub donation_id: i64,
    pub order_id: String,
    pub amount: String,
    pub amount_minor: i64,
    pub currency: String,
    pub receipt: String,
    /// Public key id the client passes to the checkout SDK
    pub key_id: String,
}

impl DonationOrderResponse {
    pub fn new(order: DonationOrder, key_id: &str) -> Self {
        Self {
            donation_id: order.donation_id,
            order_id: order.order_id.0,
            amount: order.amount_major,
            amount_minor: order.amount.value(),
            currency: order.currency,
            receipt: order.receipt,
            key_id: key_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationResponse {
    pub id: i64,
    pub organization_id: i64,
    pub event_id: Option<i64>,
    pub amount: String,
    pub currency: String,
    pub status: DonationStatus,
    pub order_id: String,
    pub payment_id: Option<String>,
    pub utr: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Donation> for DonationResponse {
    fn from(d: Donation) -> Self {
        Self {
            id: d.id,
            organization_id: d.organization_id,
            event_id: d.event_id,
            amount: d.amount.to_major_string(),
            currency: d.currency,
            status: d.status,
            order_id: d.gateway_order_id.0,
            payment_id: d.gateway_payment_id,
            utr: d.utr,
            payment_method: d.payment_method,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationListResponse {
    pub donations: Vec<DonationResponse>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl From<DonationPage> for DonationListResponse {
    fn from(page: DonationPage) -> Self {
        let total_pages = page.total_pages();
        let DonationPage { donations, page, limit, total } = page;
        let donations = donations.into_iter().map(DonationResponse::from).collect();
        Self { donations, page, limit, total, total_pages }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationStatsResponse {
    pub total_donated: String,
    pub captured_count: i64,
    pub pending_count: i64,
    pub failed_count: i64,
    pub organizations_supported: i64,
}

impl From<DonationStats> for DonationStatsResponse {
    fn from(s: DonationStats) -> Self {
        Self {
            total_donated: s.total_donated.to_major_string(),
            captured_count: s.captured_count,
            pending_count: s.pending_count,
            failed_count: s.failed_count,
            organizations_supported: s.organizations_supported,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventProgressResponse {
    pub event_id: i64,
    pub organization_id: i64,
    pub title: String,
    pub is_active: bool,
    pub raised: String,
    pub target: Option<String>,
    pub percent_funded: Option<String>,
}

impl From<EventProgress> for EventProgressResponse {
    fn from(p: EventProgress) -> Self {
        Self {
            event_id: p.event.id,
            organization_id: p.event.organization_id,
            title: p.event.title,
            is_active: p.event.is_active,
            raised: p.raised.to_major_string(),
            target: p.target.map(|t| t.to_major_string()),
            percent_funded: p.percent_funded,
        }
    }
}
