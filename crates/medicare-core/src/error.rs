use thiserror::Error;

/// Top-level error type for the Medicare client.
///
/// Subsystem crates with their own error types implement
/// `From<SubsystemError> for MedicareError` so that `?` works across crate
/// boundaries. Blank-input skips are not errors and never appear here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MedicareError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Camera access denied: {0}")]
    DeviceAccessDenied(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Image encoding error: {0}")]
    Encoding(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Payload too large: {size} bytes exceeds {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },
}

impl From<toml::de::Error> for MedicareError {
    fn from(err: toml::de::Error) -> Self {
        MedicareError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MedicareError {
    fn from(err: toml::ser::Error) -> Self {
        MedicareError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MedicareError {
    fn from(err: serde_json::Error) -> Self {
        MedicareError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Medicare operations.
pub type Result<T> = std::result::Result<T, MedicareError>;
