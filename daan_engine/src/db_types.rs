use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use daan_common::MinorUnits;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------   DonationStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    /// A gateway order exists, and we are waiting for the devotee to complete payment.
    Pending,
    /// Payment was verified and the funds have been credited. Terminal.
    Captured,
    /// Signature verification failed, or the gateway reported the payment as failed. Terminal.
    Failed,
}

impl DonationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DonationStatus::Pending => write!(f, "pending"),
            DonationStatus::Captured => write!(f, "captured"),
            DonationStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for DonationStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "captured" => Ok(Self::Captured),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid donation status: {s}"))),
        }
    }
}

//--------------------------------------    GatewayOrderId    ---------------------------------------------------------
/// The order identifier assigned by the payment gateway. Exactly one donation exists per gateway order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct GatewayOrderId(pub String);

impl FromStr for GatewayOrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for GatewayOrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GatewayOrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for GatewayOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl GatewayOrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------       Donation       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Donation {
    pub id: i64,
    pub devotee_id: i64,
    pub organization_id: i64,
    pub event_id: Option<i64>,
    /// Always in minor currency units
    pub amount: MinorUnits,
    pub currency: String,
    pub gateway_order_id: GatewayOrderId,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    /// Bank reference (UTR / RRN) reported by the gateway after capture
    pub utr: Option<String>,
    pub bank_transaction_id: Option<String>,
    pub payment_method: Option<String>,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDonation {
    pub devotee_id: i64,
    pub organization_id: i64,
    pub event_id: Option<i64>,
    pub amount: MinorUnits,
    pub currency: String,
    pub gateway_order_id: GatewayOrderId,
}

impl NewDonation {
    pub fn new(devotee_id: i64, organization_id: i64, amount: MinorUnits, gateway_order_id: GatewayOrderId) -> Self {
        Self {
            devotee_id,
            organization_id,
            event_id: None,
            amount,
            currency: daan_common::CURRENCY_CODE.to_string(),
            gateway_order_id,
        }
    }

    pub fn with_event(mut self, event_id: Option<i64>) -> Self {
        self.event_id = event_id;
        self
    }

    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }
}

//--------------------------------------  PaymentEnrichment   ---------------------------------------------------------
/// Optional details about a captured payment, fetched from the gateway on a best-effort basis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEnrichment {
    pub method: Option<String>,
    pub acquirer_reference: Option<String>,
    pub bank_transaction_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDetails {
    pub payment_id: String,
    pub signature: String,
    pub enrichment: PaymentEnrichment,
}

impl CaptureDetails {
    pub fn new(payment_id: &str, signature: &str) -> Self {
        Self { payment_id: payment_id.to_string(), signature: signature.to_string(), enrichment: Default::default() }
    }

    pub fn with_enrichment(mut self, enrichment: PaymentEnrichment) -> Self {
        self.enrichment = enrichment;
        self
    }
}

//--------------------------------------     Organization     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrganizationType {
    Temple,
    Church,
    Masjid,
    Gurudwara,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub org_type: OrganizationType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrganization {
    pub name: String,
    pub org_type: OrganizationType,
}

impl NewOrganization {
    pub fn new(name: &str, org_type: OrganizationType) -> Self {
        Self { name: name.to_string(), org_type }
    }
}

//--------------------------------------        Event         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    General,
    Crowdfunding,
    Charity,
}

impl EventType {
    /// Fundraising events must declare what they are raising towards.
    pub fn requires_target(&self) -> bool {
        matches!(self, Self::Crowdfunding | Self::Charity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub organization_id: i64,
    pub event_type: EventType,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub target_amount: Option<MinorUnits>,
    /// Only ever increases, as donations towards this event are captured
    pub raised_amount: MinorUnits,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub organization_id: i64,
    pub event_type: EventType,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub target_amount: Option<MinorUnits>,
}

impl NewEvent {
    pub fn new(organization_id: i64, event_type: EventType, title: &str, start_date: DateTime<Utc>) -> Self {
        Self {
            organization_id,
            event_type,
            title: title.to_string(),
            description: None,
            start_date,
            end_date: start_date,
            target_amount: None,
        }
    }

    pub fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = end_date;
        self
    }

    pub fn with_target(mut self, target: MinorUnits) -> Self {
        self.target_amount = Some(target);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Event title cannot be empty".to_string());
        }
        if self.end_date < self.start_date {
            return Err("Event cannot end before it starts".to_string());
        }
        match self.target_amount {
            None if self.event_type.requires_target() => {
                Err(format!("A target amount is required for {:?} events", self.event_type))
            },
            Some(t) if !t.is_positive() => Err("The target amount must be positive".to_string()),
            _ => Ok(()),
        }
    }
}

//--------------------------------------       Favorite       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Favorite {
    pub devotee_id: i64,
    pub organization_id: i64,
    /// 1-based display order. Positions are kept contiguous.
    pub position: i64,
    pub created_at: DateTime<Utc>,
}
