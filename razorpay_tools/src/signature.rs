//! Razorpay signs two things with HMAC-SHA256, both hex encoded:
//!
//! * Checkout results: `HMAC(key_secret, "{order_id}|{payment_id}")`, returned to the client as
//!   `razorpay_signature` once payment completes.
//! * Webhook bodies: `HMAC(webhook_secret, raw_body)`, sent in the `X-Razorpay-Signature` header.
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Calculates the hex-encoded HMAC-SHA256 of `data` under `secret`.
pub fn calculate_hmac(secret: &str, data: &[u8]) -> String {
    // Infallible: HMAC takes keys of any length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(data);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks a hex-encoded HMAC-SHA256 `signature` of `data`. The comparison runs in constant time.
///
/// Malformed signatures (wrong length, non-hex characters) simply fail verification.
pub fn verify_hmac(secret: &str, data: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(data);
    mac.verify_slice(&expected).is_ok()
}

/// The signature Razorpay attaches to a successful checkout for `order_id` and `payment_id`.
pub fn checkout_signature(key_secret: &str, order_id: &str, payment_id: &str) -> String {
    calculate_hmac(key_secret, checkout_message(order_id, payment_id).as_bytes())
}

pub fn verify_checkout_signature(key_secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    if order_id.is_empty() || payment_id.is_empty() {
        return false;
    }
    verify_hmac(key_secret, checkout_message(order_id, payment_id).as_bytes(), signature)
}

fn checkout_message(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}
