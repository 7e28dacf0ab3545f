use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

/// Main error type for the relay
#[derive(Error, Debug)]
pub enum RelayError {
    /// The request path does not decode to an http(s) URL
    #[error("Invalid target URL: {0}")]
    InvalidTargetUrl(String),

    /// The origin answered with a non-success status
    #[error("HTTP error {status}: {reason}. URL: {url}. Body: {body}")]
    Upstream {
        status: u16,
        reason: String,
        url: String,
        body: String,
    },

    /// Transport-level failure while talking to the origin
    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// Master playlist descent went deeper than allowed
    #[error("Exceeded maximum recursion depth ({max}) processing master playlist: {url}")]
    RecursionLimit { max: u32, url: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// HTTP status the error is surfaced with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidTargetUrl(_) => StatusCode::BAD_REQUEST,
            RelayError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            RelayError::InvalidTargetUrl(_) => "Invalid target URL".to_string(),
            _ => format!("Proxy request failed: {}", self),
        };

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RelayError>;
