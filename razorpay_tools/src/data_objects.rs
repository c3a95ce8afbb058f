use daan_common::MinorUnits;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRazorpayOrder {
    /// Amount in the smallest currency unit
    pub amount: MinorUnits,
    pub currency: String,
    /// Our own reference for the order, at most 40 characters
    pub receipt: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub notes: Value,
}

impl NewRazorpayOrder {
    pub fn new(amount: MinorUnits, currency: &str, receipt: &str) -> Self {
        Self { amount, currency: currency.to_string(), receipt: receipt.to_string(), notes: Value::Null }
    }

    pub fn with_notes(mut self, notes: Value) -> Self {
        self.notes = notes;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: MinorUnits,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub status: String,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcquirerData {
    #[serde(default)]
    pub rrn: Option<String>,
    #[serde(default)]
    pub upi_transaction_id: Option<String>,
    #[serde(default)]
    pub bank_transaction_id: Option<String>,
    #[serde(default)]
    pub auth_code: Option<String>,
}

impl AcquirerData {
    /// The reference a payer sees on their bank statement (UTR). UPI payments report it as the RRN.
    pub fn utr(&self) -> Option<String> {
        self.rrn.clone().or_else(|| self.upi_transaction_id.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RazorpayPayment {
    pub id: String,
    pub amount: MinorUnits,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub acquirer_data: AcquirerData,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// The envelope Razorpay uses for every webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub payment: Option<WebhookPaymentEntity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPaymentEntity {
    pub entity: RazorpayPayment,
}

impl WebhookEvent {
    pub fn payment(&self) -> Option<&RazorpayPayment> {
        self.payload.payment.as_ref().map(|p| &p.entity)
    }
}
