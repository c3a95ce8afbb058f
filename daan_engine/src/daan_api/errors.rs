use std::fmt::Display;

use thiserror::Error;

use crate::traits::{DirectoryError, GatewayError, LedgerError};

/// Business rules that a request can fall foul of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyViolation {
    NotFavorited,
    SignatureMismatch,
    PaymentFailed,
    AmountMismatch,
    FavoritesLimit,
    AlreadyFavorited,
}

impl Display for PolicyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PolicyViolation::NotFavorited => "not favorited",
            PolicyViolation::SignatureMismatch => "signature mismatch",
            PolicyViolation::PaymentFailed => "payment failed",
            PolicyViolation::AmountMismatch => "amount mismatch",
            PolicyViolation::FavoritesLimit => "favorites limit reached",
            PolicyViolation::AlreadyFavorited => "already favorited",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("Invalid input. {0}")]
    ValidationError(String),
    #[error("{0}")]
    PolicyError(PolicyViolation),
    #[error("{0}")]
    NotFound(String),
    #[error("The payment gateway is not configured. {0}")]
    ConfigurationError(String),
    #[error("The payment gateway could not complete the request. {0}")]
    GatewayError(String),
    #[error("The donation could not be saved. Please try again. {0}")]
    StorageError(String),
    #[error("{0}")]
    InvalidState(String),
}

impl SettlementError {
    /// A stable, machine-readable name for the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            SettlementError::ValidationError(_) => "ValidationError",
            SettlementError::PolicyError(_) => "PolicyError",
            SettlementError::NotFound(_) => "NotFoundError",
            SettlementError::ConfigurationError(_) => "ConfigurationError",
            SettlementError::GatewayError(_) => "GatewayError",
            SettlementError::StorageError(_) => "StorageError",
            SettlementError::InvalidState(_) => "InvalidStateError",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::GatewayError(_) | Self::StorageError(_))
    }
}

impl From<LedgerError> for SettlementError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::DatabaseError(s) => Self::StorageError(s),
            LedgerError::DonationNotFound(_) => Self::NotFound(e.to_string()),
            LedgerError::DuplicateGatewayOrder(_) => Self::StorageError(e.to_string()),
            LedgerError::InvalidState { .. } => Self::InvalidState(e.to_string()),
        }
    }
}

impl From<DirectoryError> for SettlementError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::DatabaseError(s) => Self::StorageError(s),
            DirectoryError::OrganizationNotFound(_) | DirectoryError::EventNotFound(_) => Self::NotFound(e.to_string()),
            DirectoryError::FavoritesLimitReached => Self::PolicyError(PolicyViolation::FavoritesLimit),
            DirectoryError::AlreadyFavorited(_) => Self::PolicyError(PolicyViolation::AlreadyFavorited),
            DirectoryError::InvalidEvent(_) | DirectoryError::InvalidAmount(_) => Self::ValidationError(e.to_string()),
        }
    }
}

impl From<GatewayError> for SettlementError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Configuration(s) => Self::ConfigurationError(s),
            e => Self::GatewayError(e.to_string()),
        }
    }
}
