use bridge_traits::BridgeError;
use thiserror::Error;

/// Failure of a single API call.
///
/// Non-2xx responses are split so that callers (and the auth interceptor)
/// can tell an expired session from any other rejection.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (unreachable host, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered 401.
    #[error("Unauthorized: {body}")]
    Unauthorized { body: String },

    /// The backend answered with any other non-2xx status.
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The token refresh triggered by a 401 failed; the session was cleared.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(#[source] Box<ApiError>),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the backend responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

impl From<BridgeError> for ApiError {
    fn from(error: BridgeError) -> Self {
        ApiError::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Serialization(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
