//! # Daan server
//! This crate hosts the HTTP surface of the Daan donation platform. It is responsible for:
//! * Authenticating devotees from their session token.
//! * Creating donation orders and verifying completed checkouts through the settlement engine.
//! * Receiving signed payment notifications (webhooks) from Razorpay.
//! * Serving donation history, favorites and fundraising progress.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/donations/...`, `/api/favorites/...`, `/api/events/...`: Devotee routes. See [routes](routes/index.html).
//! * `/razorpay/webhook`: Payment notifications from the gateway, authenticated by HMAC signature.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
