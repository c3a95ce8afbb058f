pub mod directory_api;
pub mod errors;
pub mod settlement_api;
pub mod settlement_objects;
