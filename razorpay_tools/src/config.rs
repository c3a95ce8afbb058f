use std::time::Duration;

use daan_common::Secret;
use log::*;

pub const DEFAULT_RAZORPAY_API_URL: &str = "https://api.razorpay.com/v1";
pub const DEFAULT_RAZORPAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub api_url: String,
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub webhook_secret: Secret<String>,
    /// Upper bound for every request made to the gateway.
    pub timeout: Duration,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_RAZORPAY_API_URL.to_string(),
            key_id: String::default(),
            key_secret: Secret::default(),
            webhook_secret: Secret::default(),
            timeout: DEFAULT_RAZORPAY_TIMEOUT,
        }
    }
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("DAAN_RAZORPAY_API_URL").unwrap_or_else(|_| {
            debug!("DAAN_RAZORPAY_API_URL not set, using {DEFAULT_RAZORPAY_API_URL}");
            DEFAULT_RAZORPAY_API_URL.to_string()
        });
        let key_id = std::env::var("DAAN_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            error!("DAAN_RAZORPAY_KEY_ID not set. Donation orders cannot be created until it is configured.");
            String::default()
        });
        let key_secret = Secret::new(std::env::var("DAAN_RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            error!("DAAN_RAZORPAY_KEY_SECRET not set. Payments cannot be created or verified until it is configured.");
            String::default()
        }));
        let webhook_secret = Secret::new(std::env::var("DAAN_RAZORPAY_WEBHOOK_SECRET").unwrap_or_else(|_| {
            warn!("DAAN_RAZORPAY_WEBHOOK_SECRET not set. Gateway webhooks will be rejected.");
            String::default()
        }));
        let timeout = std::env::var("DAAN_GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid value for DAAN_GATEWAY_TIMEOUT_SECS ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RAZORPAY_TIMEOUT);
        Self { api_url, key_id, key_secret, webhook_secret, timeout }
    }

    /// Both halves of the API key pair are needed to talk to the gateway.
    pub fn has_credentials(&self) -> bool {
        !self.key_id.trim().is_empty() && !self.key_secret.is_blank()
    }
}
