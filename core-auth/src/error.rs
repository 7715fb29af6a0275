use core_api::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// A backend call failed; the original `ApiError` is preserved.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    #[error("Google sign-in is not configured")]
    OAuthNotConfigured,

    #[error("Invalid OAuth settings: {0}")]
    InvalidOAuthSettings(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error(transparent)]
    Config(#[from] core_runtime::Error),
}

impl AuthError {
    /// The underlying API error, if this failure came from a backend call.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            AuthError::Api(error) => Some(error),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
