use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{DonationCapturedEvent, DonationFailedEvent, EventHandler, EventProducer, Handler};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub donation_captured_producer: Vec<EventProducer<DonationCapturedEvent>>,
    pub donation_failed_producer: Vec<EventProducer<DonationFailedEvent>>,
}

pub struct EventHandlers {
    pub on_donation_captured: Option<EventHandler<DonationCapturedEvent>>,
    pub on_donation_failed: Option<EventHandler<DonationFailedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_donation_captured = hooks.on_donation_captured.map(|f| EventHandler::new(buffer_size, f));
        let on_donation_failed = hooks.on_donation_failed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_donation_captured, on_donation_failed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_donation_captured {
            result.donation_captured_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_donation_failed {
            result.donation_failed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_donation_captured {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_donation_failed {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_donation_captured: Option<Handler<DonationCapturedEvent>>,
    pub on_donation_failed: Option<Handler<DonationFailedEvent>>,
}

impl EventHooks {
    pub fn on_donation_captured<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DonationCapturedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_donation_captured = Some(Arc::new(f));
        self
    }

    pub fn on_donation_failed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(DonationFailedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_donation_failed = Some(Arc::new(f));
        self
    }
}
