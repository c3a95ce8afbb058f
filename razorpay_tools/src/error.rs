use thiserror::Error;

#[derive(Debug, Error)]
pub enum RazorpayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Razorpay credentials are not configured: {0}")]
    MissingCredentials(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("The Razorpay API did not respond in time")]
    Timeout,
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl From<reqwest::Error> for RazorpayApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::JsonError(e.to_string())
        } else if e.is_builder() {
            Self::RestRequestError(e.to_string())
        } else {
            Self::RestResponseError(e.to_string())
        }
    }
}
