//! Helpers for tests that need a real database or a predictable payment gateway.
pub mod fake_gateway;
pub mod fixtures;
pub mod prepare_env;

pub use fake_gateway::{FakeGateway, TEST_KEY_SECRET};
