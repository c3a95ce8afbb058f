//! Hooks that record settlement events in the server log.
use daan_engine::events::{DonationCapturedEvent, DonationFailedEvent, EventHandlers, EventHooks};
use log::*;

pub const EVENT_BUFFER_SIZE: usize = 25;

pub fn create_logging_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_donation_captured(|ev| {
        let DonationCapturedEvent { donation, credited_event } = ev;
        Box::pin(async move {
            match credited_event {
                Some(event) => info!(
                    "📬️ Donation #{} of {} captured. Event #{} \"{}\" has now raised {}",
                    donation.id, donation.amount, event.id, event.title, event.raised_amount
                ),
                None => info!(
                    "📬️ Donation #{} of {} to organization #{} captured",
                    donation.id, donation.amount, donation.organization_id
                ),
            }
        })
    });
    hooks.on_donation_failed(|ev| {
        let DonationFailedEvent { donation, reason } = ev;
        Box::pin(async move {
            warn!("📬️ Donation #{} (order {}) failed. {reason}", donation.id, donation.gateway_order_id);
        })
    });
    EventHandlers::new(EVENT_BUFFER_SIZE, hooks)
}
