use std::{fmt::Debug, future::Future};

use log::*;

use crate::{
    daan_api::{
        errors::{PolicyViolation, SettlementError},
        settlement_objects::{DonationOrder, GatewayNotification, NotificationKind, SettlementConfig},
    },
    db_types::{CaptureDetails, Donation, DonationStatus, GatewayOrderId, MinorUnits, NewDonation, PaymentEnrichment},
    events::{DonationCapturedEvent, DonationFailedEvent, EventProducers},
    helpers::donation_receipt,
    traits::{
        CaptureResult,
        DonationDatabase,
        DonationPage,
        DonationStats,
        GatewayError,
        LedgerError,
        Pagination,
        PaymentGateway,
    },
};

/// `SettlementApi` coordinates the payment gateway, the donation ledger and the event funding aggregator into the
/// create-order and verify-payment flows.
///
/// It holds no state of its own beyond its collaborators. Every mutual-exclusion guarantee (one capture per donation,
/// no lost event credits) is delegated to the storage backend, so any number of instances can run side by side.
pub struct SettlementApi<B, G> {
    db: B,
    gateway: G,
    config: SettlementConfig,
    producers: EventProducers,
}

impl<B, G> Debug for SettlementApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettlementApi ({:?})", self.config)
    }
}

impl<B, G> SettlementApi<B, G> {
    pub fn new(db: B, gateway: G, config: SettlementConfig, producers: EventProducers) -> Self {
        Self { db, gateway, config, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }
}

impl<B, G> SettlementApi<B, G>
where
    B: DonationDatabase,
    G: PaymentGateway,
{
    /// Opens a new donation and reserves a matching order with the payment gateway.
    ///
    /// The checks run in this order: amount, favorite, organization, event. Nothing is written unless all of them
    /// pass and the gateway accepts the order. If the gateway call succeeds but the ledger write fails, the gateway
    /// order is simply abandoned and the caller should retry.
    pub async fn create_donation_order(
        &self,
        devotee_id: i64,
        org_id: i64,
        amount: &str,
        event_id: Option<i64>,
    ) -> Result<DonationOrder, SettlementError> {
        let amount = self.validate_amount(amount)?;
        if !self.db.is_favorite(devotee_id, org_id).await? {
            debug!("💰️ Devotee {devotee_id} tried to donate to organization #{org_id}, which is not a favorite");
            return Err(SettlementError::PolicyError(PolicyViolation::NotFavorited));
        }
        let org = self
            .db
            .fetch_organization(org_id)
            .await?
            .filter(|o| o.is_active)
            .ok_or_else(|| SettlementError::NotFound(format!("Organization {org_id} was not found")))?;
        if let Some(event_id) = event_id {
            match self.db.fetch_event(event_id).await? {
                Some(e) if e.organization_id == org.id && e.is_active => {},
                _ => {
                    return Err(SettlementError::NotFound(format!(
                        "Event {event_id} was not found for organization {org_id}"
                    )))
                },
            }
        }
        let receipt = donation_receipt(devotee_id, org_id);
        let order = self.with_timeout(self.gateway.create_order(amount, &self.config.currency, &receipt)).await?;
        if order.amount != amount {
            error!("💰️ Gateway order {} is for {} but {amount} was requested", order.order_id, order.amount);
            return Err(GatewayError::InvalidResponse(format!("order {} has the wrong amount", order.order_id)).into());
        }
        debug!("💰️ Gateway order {} created for receipt {receipt}", order.order_id);
        let new_donation = NewDonation::new(devotee_id, org.id, amount, order.order_id.clone())
            .with_event(event_id)
            .with_currency(&order.currency);
        let donation = self.db.open_donation(new_donation).await.map_err(|e| {
            error!("💰️ Gateway order {} is orphaned. Could not open the donation: {e}", order.order_id);
            SettlementError::from(e)
        })?;
        info!("💰️ Donation #{} of {amount} opened for devotee {devotee_id} to {}", donation.id, org.name);
        Ok(DonationOrder {
            donation_id: donation.id,
            order_id: order.order_id,
            amount,
            amount_major: amount.to_major_string(),
            currency: order.currency,
            receipt,
        })
    }

    /// Verifies the checkout signature for a payment and captures the donation.
    ///
    /// Safe to call repeatedly, and concurrently with a gateway notification for the same order. A donation that is
    /// already captured is returned as is. An invalid signature fails the donation permanently.
    pub async fn verify_donation_payment(
        &self,
        order_id: &GatewayOrderId,
        payment_id: &str,
        signature: &str,
        devotee_id: i64,
    ) -> Result<Donation, SettlementError> {
        let donation = self
            .db
            .fetch_donation_for_order(order_id, devotee_id)
            .await?
            .ok_or_else(|| SettlementError::NotFound(format!("No donation was found for order {order_id}")))?;
        match donation.status {
            DonationStatus::Captured => {
                debug!("💰️ Donation #{} is already captured. Returning it unchanged.", donation.id);
                return Ok(donation);
            },
            DonationStatus::Failed => return Err(SettlementError::PolicyError(PolicyViolation::PaymentFailed)),
            DonationStatus::Pending => {},
        }
        if !self.gateway.verify_signature(order_id, payment_id, signature)? {
            warn!("💰️ Signature mismatch for donation #{} (order {order_id}, payment {payment_id})", donation.id);
            self.fail_donation(donation.id, "signature mismatch").await?;
            return Err(SettlementError::PolicyError(PolicyViolation::SignatureMismatch));
        }
        let enrichment = self.payment_enrichment(payment_id).await;
        let details = CaptureDetails::new(payment_id, signature).with_enrichment(enrichment);
        self.capture(donation.id, details).await
    }

    /// Applies a gateway notification that has already been authenticated by the caller.
    ///
    /// Returns `None` when the notification refers to an order this service does not know about.
    pub async fn settle_gateway_notification(
        &self,
        notification: GatewayNotification,
    ) -> Result<Option<Donation>, SettlementError> {
        let order_id = &notification.order_id;
        let Some(donation) = self.db.fetch_donation_by_gateway_order(order_id).await? else {
            info!("💰️ Ignoring gateway notification for unknown order {order_id}");
            return Ok(None);
        };
        match notification.kind {
            NotificationKind::Captured => {
                if let Some(amount) = notification.amount.filter(|a| *a != donation.amount) {
                    warn!("💰️ Gateway reports {amount} captured for donation #{}, expected {}", donation.id, donation.amount);
                    return Err(SettlementError::PolicyError(PolicyViolation::AmountMismatch));
                }
                let details = CaptureDetails::new(&notification.payment_id, &notification.signature)
                    .with_enrichment(notification.enrichment);
                match self.capture(donation.id, details).await {
                    Ok(d) => Ok(Some(d)),
                    Err(SettlementError::PolicyError(PolicyViolation::PaymentFailed)) => {
                        error!(
                            "💰️ The gateway captured payment {} for donation #{}, which has already failed. This \
                             needs manual reconciliation.",
                            notification.payment_id, donation.id
                        );
                        Ok(Some(donation))
                    },
                    Err(e) => Err(e),
                }
            },
            // The devotee can retry checkout on the same order, so a failed attempt leaves the donation pending.
            NotificationKind::Failed => {
                info!(
                    "💰️ Payment attempt {} for donation #{} ({}) failed at the gateway",
                    notification.payment_id, donation.id, donation.status
                );
                Ok(Some(donation))
            },
        }
    }

    /// A page of the devotee's donations, newest first.
    pub async fn list_donations(&self, devotee_id: i64, page: u32, limit: u32) -> Result<DonationPage, SettlementError> {
        let page = Pagination::new(page, limit).map_err(SettlementError::ValidationError)?;
        let result = self.db.fetch_donations_for_devotee(devotee_id, page).await?;
        Ok(result)
    }

    pub async fn donation_stats(&self, devotee_id: i64) -> Result<DonationStats, SettlementError> {
        let stats = self.db.fetch_donation_stats(devotee_id).await?;
        Ok(stats)
    }

    fn validate_amount(&self, amount: &str) -> Result<MinorUnits, SettlementError> {
        let amount = MinorUnits::parse_major(amount).map_err(|e| SettlementError::ValidationError(e.to_string()))?;
        let SettlementConfig { min_donation, max_donation, .. } = &self.config;
        if amount < *min_donation {
            return Err(SettlementError::ValidationError(format!("The minimum donation is {min_donation}")));
        }
        if amount > *max_donation {
            return Err(SettlementError::ValidationError(format!("The maximum donation is {max_donation}")));
        }
        Ok(amount)
    }

    async fn with_timeout<T, F>(&self, call: F) -> Result<T, GatewayError>
    where F: Future<Output = Result<T, GatewayError>> {
        let limit = self.config.gateway_timeout;
        tokio::time::timeout(limit, call).await.map_err(|_| {
            warn!("🏦️ Payment gateway call timed out after {limit:?}");
            GatewayError::Timeout(limit.as_secs())
        })?
    }

    /// Enrichment is best-effort. Failures are logged and never fail the capture.
    async fn payment_enrichment(&self, payment_id: &str) -> PaymentEnrichment {
        match self.with_timeout(self.gateway.fetch_payment_details(payment_id)).await {
            Ok(enrichment) => enrichment,
            Err(e) => {
                warn!("💰️ Could not fetch details for payment {payment_id}. Capturing without them. {e}");
                PaymentEnrichment::default()
            },
        }
    }

    async fn capture(&self, donation_id: i64, details: CaptureDetails) -> Result<Donation, SettlementError> {
        let result = match self.db.capture_donation(donation_id, details).await {
            Ok(result) => result,
            Err(LedgerError::InvalidState { status: DonationStatus::Failed, .. }) => {
                return Err(SettlementError::PolicyError(PolicyViolation::PaymentFailed))
            },
            Err(e) => return Err(e.into()),
        };
        if result.newly_captured {
            info!("💰️ Donation #{} of {} captured", result.donation.id, result.donation.amount);
            self.call_donation_captured_hook(&result).await;
        }
        Ok(result.donation)
    }

    /// Fails a pending donation. Returns the failed donation, or `None` if it was captured in the meantime.
    async fn fail_donation(&self, donation_id: i64, reason: &str) -> Result<Option<Donation>, SettlementError> {
        match self.db.mark_donation_failed(donation_id).await {
            Ok((donation, newly_failed)) => {
                if newly_failed {
                    info!("💰️ Donation #{donation_id} failed: {reason}");
                    self.call_donation_failed_hook(&donation, reason).await;
                }
                Ok(Some(donation))
            },
            Err(LedgerError::InvalidState { status: DonationStatus::Captured, .. }) => {
                info!("💰️ Donation #{donation_id} was captured concurrently, so it cannot fail ({reason})");
                Ok(None)
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn call_donation_captured_hook(&self, result: &CaptureResult) {
        for emitter in &self.producers.donation_captured_producer {
            debug!("💰️📬️ Notifying donation captured hook subscribers");
            let event = DonationCapturedEvent::new(result.donation.clone(), &result.funding);
            emitter.publish_event(event).await;
        }
    }

    async fn call_donation_failed_hook(&self, donation: &Donation, reason: &str) {
        for emitter in &self.producers.donation_failed_producer {
            debug!("💰️📬️ Notifying donation failed hook subscribers");
            let event = DonationFailedEvent::new(donation.clone(), reason);
            emitter.publish_event(event).await;
        }
    }
}
