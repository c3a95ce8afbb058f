//! Webhook signature middleware.
//!
//! Razorpay signs every webhook delivery with the webhook secret configured in its dashboard
//! (`DAAN_RAZORPAY_WEBHOOK_SECRET` here). The signature is the hex-encoded HMAC-SHA256 of the raw request body and is
//! sent in the `X-Razorpay-Signature` header.
//!
//! Wrap the webhook scope with [`HmacMiddlewareFactory`] and unsigned or tampered notifications never reach the
//! settlement engine. The body is buffered for the check and handed on to the handler untouched.
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::{h1, header::HeaderMap};
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorBadRequest, ErrorForbidden},
    web,
    Error,
};
use daan_common::Secret;
use futures::future::LocalBoxFuture;
use log::*;
use razorpay_tools::verify_hmac;

pub const RAZORPAY_SIGNATURE_HEADER: &str = "X-Razorpay-Signature";

#[derive(Debug)]
struct SignatureCheck {
    header: String,
    secret: Secret<String>,
    // When false every request is let through unchecked
    enabled: bool,
}

impl SignatureCheck {
    fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), Error> {
        if self.secret.is_blank() {
            warn!("🔐️ No webhook secret is configured. Rejecting webhook.");
            return Err(ErrorForbidden("Webhooks are not configured."));
        }
        let Some(signature) = headers.get(self.header.as_str()).and_then(|v| v.to_str().ok()) else {
            warn!("🔐️ Webhook carried no {} header. Rejecting it.", self.header);
            return Err(ErrorForbidden("No HMAC signature found."));
        };
        if !verify_hmac(self.secret.reveal(), body, signature) {
            warn!("🔐️ Webhook signature does not match the body. Rejecting it.");
            return Err(ErrorForbidden("Invalid HMAC signature."));
        }
        trace!("🔐️ Webhook signature ✅️");
        Ok(())
    }
}

pub struct HmacMiddlewareFactory {
    check: Rc<SignatureCheck>,
}

impl HmacMiddlewareFactory {
    pub fn new(header: &str, secret: Secret<String>, enabled: bool) -> Self {
        if !enabled {
            warn!("🔐️ Webhook signature checks are DISABLED. {header} will not be checked.");
        }
        Self { check: Rc::new(SignatureCheck { header: header.to_string(), secret, enabled }) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HmacMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = HmacMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacMiddlewareService { check: Rc::clone(&self.check), service: Rc::new(service) }))
    }
}

pub struct HmacMiddlewareService<S> {
    check: Rc<SignatureCheck>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HmacMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let check = Rc::clone(&self.check);
        Box::pin(async move {
            if !check.enabled {
                return service.call(req).await;
            }
            let body = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Could not buffer webhook body. {e}");
                ErrorBadRequest("Failed to extract request data.")
            })?;
            check.verify(req.headers(), &body)?;
            req.set_payload(into_payload(body));
            service.call(req).await
        })
    }
}

fn into_payload(body: web::Bytes) -> Payload {
    let (_, mut payload) = h1::Payload::create(true);
    payload.unread_data(body);
    Payload::from(payload)
}
