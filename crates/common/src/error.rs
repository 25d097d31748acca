//! Common error types and handling for GymDesk

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the GymDesk application
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Get the error code for logs and CLI output
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}
