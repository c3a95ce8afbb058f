use std::sync::Arc;

use log::*;
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};

use crate::{config::RazorpayConfig, NewRazorpayOrder, RazorpayApiError, RazorpayOrder, RazorpayPayment};

#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for RazorpayApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RazorpayApi ({}, key {})", self.config.api_url, self.config.key_id)
    }
}

impl RazorpayApi {
    /// Builds the client. Missing credentials are not an error here: the server can still start and serve
    /// read-only routes. Every gateway call checks for credentials and fails with `MissingCredentials` instead.
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &RazorpayConfig {
        &self.config
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, RazorpayApiError> {
        if !self.config.has_credentials() {
            return Err(RazorpayApiError::MissingCredentials("key id and key secret are required".into()));
        }
        let url = self.url(path);
        trace!("🏦️ Sending REST query: {method} {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await?;
        if response.status().is_success() {
            trace!("🏦️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| RazorpayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await?;
            Err(RazorpayApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    pub async fn create_order(&self, order: NewRazorpayOrder) -> Result<RazorpayOrder, RazorpayApiError> {
        debug!("🏦️ Creating gateway order for {} (receipt {})", order.amount, order.receipt);
        let result = self.rest_query::<RazorpayOrder, _>(Method::POST, "/orders", Some(order)).await?;
        info!("🏦️ Gateway order {} created for {}", result.id, result.amount);
        Ok(result)
    }

    pub async fn fetch_payment(&self, payment_id: &str) -> Result<RazorpayPayment, RazorpayApiError> {
        let path = format!("/payments/{payment_id}");
        debug!("🏦️ Fetching payment {payment_id}");
        let result = self.rest_query::<RazorpayPayment, ()>(Method::GET, &path, None).await?;
        trace!("🏦️ Payment {payment_id} has status {} via {:?}", result.status, result.method);
        Ok(result)
    }
}
