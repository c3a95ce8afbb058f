use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{GatewayOrderId, MinorUnits, PaymentEnrichment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub order_id: GatewayOrderId,
    pub amount: MinorUnits,
    pub currency: String,
}

/// The adapter between the settlement engine and the external payment processor.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Reserves a gateway order for `amount`. The amount is a positive number of minor units.
    ///
    /// Fails with [`GatewayError::Configuration`] if credentials are absent, and [`GatewayError::Remote`] if the
    /// processor is unreachable or rejects the request.
    async fn create_order(&self, amount: MinorUnits, currency: &str, receipt: &str)
        -> Result<GatewayOrder, GatewayError>;

    /// Checks the checkout signature over `"{order_id}|{payment_id}"`.
    ///
    /// Malformed input yields `Ok(false)`. Only a missing secret is an error.
    fn verify_signature(
        &self,
        order_id: &GatewayOrderId,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool, GatewayError>;

    /// Best-effort lookup of payment method and bank references.
    async fn fetch_payment_details(&self, payment_id: &str) -> Result<PaymentEnrichment, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("The payment gateway is not configured. {0}")]
    Configuration(String),
    #[error("The payment gateway request failed. {0}")]
    Remote(String),
    #[error("The payment gateway did not respond within {0} seconds")]
    Timeout(u64),
    #[error("The payment gateway returned an unexpected response. {0}")]
    InvalidResponse(String),
}
