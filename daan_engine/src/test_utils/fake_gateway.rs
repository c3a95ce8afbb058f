//! A deterministic, in-process stand-in for the payment gateway.
//!
//! Signatures use the real gateway scheme, so tests can produce valid and tampered signatures with
//! [`FakeGateway::sign`].
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
        Mutex,
    },
    time::Duration,
};

use razorpay_tools::{checkout_signature, verify_checkout_signature};

use crate::{
    db_types::{GatewayOrderId, MinorUnits, PaymentEnrichment},
    traits::{GatewayError, GatewayOrder, PaymentGateway},
};

pub const TEST_KEY_SECRET: &str = "test_key_secret";

#[derive(Default)]
struct FakeGatewayState {
    key_secret: String,
    order_counter: AtomicU64,
    next_order_id: Mutex<Option<String>>,
    fail_orders: AtomicBool,
    fail_details: AtomicBool,
    order_delay_ms: AtomicU64,
    details_delay_ms: AtomicU64,
    details_fetched: AtomicU64,
}

#[derive(Clone)]
pub struct FakeGateway {
    state: Arc<FakeGatewayState>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new(TEST_KEY_SECRET)
    }
}

impl FakeGateway {
    /// An empty secret makes the gateway behave as if it were not configured.
    pub fn new(key_secret: &str) -> Self {
        let state = FakeGatewayState { key_secret: key_secret.to_string(), ..Default::default() };
        Self { state: Arc::new(state) }
    }

    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        checkout_signature(&self.state.key_secret, order_id, payment_id)
    }

    /// The next order created will carry this id instead of a generated one.
    pub fn set_next_order_id(&self, order_id: &str) {
        *self.state.next_order_id.lock().expect("poisoned lock") = Some(order_id.to_string());
    }

    pub fn fail_order_creation(&self, fail: bool) {
        self.state.fail_orders.store(fail, Ordering::SeqCst);
    }

    pub fn fail_payment_details(&self, fail: bool) {
        self.state.fail_details.store(fail, Ordering::SeqCst);
    }

    pub fn delay_order_creation(&self, delay: Duration) {
        self.state.order_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn delay_payment_details(&self, delay: Duration) {
        self.state.details_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn orders_created(&self) -> u64 {
        self.state.order_counter.load(Ordering::SeqCst)
    }

    pub fn details_fetched(&self) -> u64 {
        self.state.details_fetched.load(Ordering::SeqCst)
    }

    fn check_configured(&self) -> Result<(), GatewayError> {
        if self.state.key_secret.is_empty() {
            return Err(GatewayError::Configuration("No key secret has been set".into()));
        }
        Ok(())
    }

    async fn pause(ms: &AtomicU64) {
        let ms = ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        amount: MinorUnits,
        currency: &str,
        _receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        self.check_configured()?;
        Self::pause(&self.state.order_delay_ms).await;
        if self.state.fail_orders.load(Ordering::SeqCst) {
            return Err(GatewayError::Remote("503 Service Unavailable".into()));
        }
        if !amount.is_positive() {
            return Err(GatewayError::Remote("amount must be at least 1".into()));
        }
        let n = self.state.order_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let order_id = self.state.next_order_id.lock().expect("poisoned lock").take();
        let order_id = order_id.unwrap_or_else(|| format!("order_fake{n:06}"));
        Ok(GatewayOrder { order_id: GatewayOrderId(order_id), amount, currency: currency.to_string() })
    }

    fn verify_signature(
        &self,
        order_id: &GatewayOrderId,
        payment_id: &str,
        signature: &str,
    ) -> Result<bool, GatewayError> {
        self.check_configured()?;
        Ok(verify_checkout_signature(&self.state.key_secret, order_id.as_str(), payment_id, signature))
    }

    async fn fetch_payment_details(&self, payment_id: &str) -> Result<PaymentEnrichment, GatewayError> {
        Self::pause(&self.state.details_delay_ms).await;
        self.state.details_fetched.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_details.load(Ordering::SeqCst) {
            return Err(GatewayError::Remote("payment lookup failed".into()));
        }
        Ok(PaymentEnrichment {
            method: Some("upi".to_string()),
            acquirer_reference: Some(format!("UTR{}", payment_id.trim_start_matches("pay_"))),
            bank_transaction_id: Some(format!("BTX{}", payment_id.trim_start_matches("pay_"))),
        })
    }
}
