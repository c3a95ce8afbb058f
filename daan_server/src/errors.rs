use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use daan_engine::{PolicyViolation, SettlementError};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("Could not read gateway notification: {0}")]
    InvalidWebhook(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    SettlementError(#[from] SettlementError),
}

impl ServerError {
    /// The stable, machine-readable error kind returned alongside every error message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequestBody(_) | Self::InvalidRequestPath(_) | Self::InvalidWebhook(_) => "ValidationError",
            Self::AuthenticationError(_) => "AuthenticationError",
            Self::ConfigurationError(_) => "ConfigurationError",
            Self::SettlementError(e) => e.kind(),
            Self::InitializeError(_) | Self::IOError(_) | Self::Unspecified(_) => "InternalError",
        }
    }

    /// The message shown to the caller. Server-side failures get a fixed message per kind and the detail only goes to
    /// the log.
    pub fn public_message(&self) -> String {
        if !self.status_code().is_server_error() {
            return self.to_string();
        }
        let message = match self {
            Self::SettlementError(SettlementError::StorageError(_)) => "The donation could not be saved. Please try again.",
            Self::SettlementError(SettlementError::GatewayError(_)) => {
                "The payment gateway could not complete the request. Please try again."
            },
            Self::SettlementError(SettlementError::ConfigurationError(_)) | Self::ConfigurationError(_) => {
                "The server is not configured to handle this request."
            },
            _ => "An internal error occurred. Please try again later.",
        };
        message.to_string()
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InvalidWebhook(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::SettlementError(e) => settlement_status_code(e),
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ Request failed with {status}. {self}");
        }
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.public_message(), "kind": self.kind() }).to_string())
    }
}

fn settlement_status_code(e: &SettlementError) -> StatusCode {
    match e {
        SettlementError::ValidationError(_) => StatusCode::BAD_REQUEST,
        SettlementError::PolicyError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SettlementError::NotFound(_) => StatusCode::NOT_FOUND,
        SettlementError::InvalidState(_) => StatusCode::CONFLICT,
        SettlementError::GatewayError(_) => StatusCode::BAD_GATEWAY,
        SettlementError::StorageError(_) => StatusCode::SERVICE_UNAVAILABLE,
        SettlementError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token has expired.")]
    Expired,
}
