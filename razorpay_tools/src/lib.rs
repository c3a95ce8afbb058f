//! Thin client for the Razorpay REST API and its HMAC-SHA256 signature schemes.
//!
//! Only the calls the donation platform needs are covered: creating orders, fetching payment details, and verifying
//! checkout and webhook signatures.
mod api;
mod config;
mod data_objects;
mod error;
mod signature;

pub use api::RazorpayApi;
pub use config::{RazorpayConfig, DEFAULT_RAZORPAY_API_URL, DEFAULT_RAZORPAY_TIMEOUT};
pub use data_objects::{
    AcquirerData,
    NewRazorpayOrder,
    RazorpayOrder,
    RazorpayPayment,
    WebhookEvent,
    WebhookPayload,
    WebhookPaymentEntity,
};
pub use error::RazorpayApiError;
pub use signature::{calculate_hmac, checkout_signature, verify_checkout_signature, verify_hmac};
