//! Error types for remote operations.

use medicare_core::error::MedicareError;

/// A remote operation that did not produce a usable response.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    Request(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else if err.is_builder() {
            GatewayError::Request(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

impl From<GatewayError> for MedicareError {
    fn from(err: GatewayError) -> Self {
        MedicareError::Remote(err.to_string())
    }
}
