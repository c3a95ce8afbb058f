use daan_engine::{
    db_types::{GatewayOrderId, MinorUnits, PaymentEnrichment},
    settlement_objects::{GatewayNotification, NotificationKind},
    traits::{GatewayError, GatewayOrder, PaymentGateway},
};
use log::*;
use razorpay_tools::{
    verify_checkout_signature,
    NewRazorpayOrder,
    RazorpayApi,
    RazorpayApiError,
    RazorpayConfig,
    RazorpayPayment,
    WebhookEvent,
};
use serde_json::json;

/// The production [`PaymentGateway`], backed by the Razorpay REST API.
#[derive(Clone, Debug)]
pub struct RazorpayGateway {
    api: RazorpayApi,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let api = RazorpayApi::new(config)?;
        Ok(Self { api })
    }

    pub fn key_id(&self) -> &str {
        &self.api.config().key_id
    }

    fn key_secret(&self) -> Result<&str, GatewayError> {
        let secret = self.api.config().key_secret.reveal();
        if secret.trim().is_empty() {
            return Err(GatewayError::Configuration("DAAN_RAZORPAY_KEY_SECRET is not set".into()));
        }
        Ok(secret)
    }
}

fn gateway_error(e: RazorpayApiError) -> GatewayError {
    match e {
        RazorpayApiError::MissingCredentials(s) => GatewayError::Configuration(s),
        RazorpayApiError::Initialization(s) => GatewayError::Configuration(s),
        RazorpayApiError::JsonError(s) => GatewayError::InvalidResponse(s),
        e => GatewayError::Remote(e.to_string()),
    }
}

impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount: MinorUnits,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let order = NewRazorpayOrder::new(amount, currency, receipt).with_notes(json!({ "receipt": receipt }));
        let order = self.api.create_order(order).await.map_err(gateway_error)?;
        Ok(GatewayOrder { order_id: GatewayOrderId(order.id), amount: order.amount, currency: order.currency })
    }

    fn verify_signature(
        &self,
        order_id: &GatewayOrderId,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool, GatewayError> {
        let secret = self.key_secret()?;
        Ok(verify_checkout_signature(secret, order_id.as_str(), payment_id, signature))
    }

    async fn fetch_payment_details(&self, payment_id: &str) -> Result<PaymentEnrichment, GatewayError> {
        let payment = self.api.fetch_payment(payment_id).await.map_err(gateway_error)?;
        Ok(enrichment_for(&payment))
    }
}

pub fn enrichment_for(payment: &RazorpayPayment) -> PaymentEnrichment {
    PaymentEnrichment {
        method: payment.method.clone(),
        acquirer_reference: payment.acquirer_data.utr(),
        bank_transaction_id: payment.acquirer_data.bank_transaction_id.clone(),
    }
}

/// Converts an authenticated webhook delivery into a notification for the settlement engine.
///
/// Only `payment.captured` and `payment.failed` events for payments attached to an order are relevant. Everything
/// else returns `None` and is acknowledged without further action.
pub fn notification_from_webhook(event: &WebhookEvent, signature: &str) -> Option<GatewayNotification> {
    let kind = match event.event.as_str() {
        "payment.captured" => NotificationKind::Captured,
        "payment.failed" => NotificationKind::Failed,
        other => {
            debug!("🏦️ Ignoring webhook event {other}");
            return None;
        },
    };
    let Some(payment) = event.payment() else {
        warn!("🏦️ {} webhook did not carry a payment entity. Ignoring it.", event.event);
        return None;
    };
    let Some(order_id) = payment.order_id.as_ref() else {
        debug!("🏦️ Payment {} is not attached to an order. Ignoring it.", payment.id);
        return None;
    };
    if let NotificationKind::Failed = kind {
        info!(
            "🏦️ Payment {} for order {order_id} failed. {}",
            payment.id,
            payment.error_description.as_deref().unwrap_or("No reason given")
        );
    }
    Some(GatewayNotification {
        kind,
        order_id: GatewayOrderId(order_id.clone()),
        payment_id: payment.id.clone(),
        signature: signature.to_string(),
        amount: Some(payment.amount),
        enrichment: enrichment_for(payment),
    })
}
