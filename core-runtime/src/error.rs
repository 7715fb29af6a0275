//! Runtime error type shared by configuration and logging setup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A setting is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A bridge was not injected and no platform default exists.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
