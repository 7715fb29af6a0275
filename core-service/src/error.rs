use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] core_auth::AuthError),

    #[error("Content error: {0}")]
    Content(#[from] core_content::ContentError),
}

impl CoreError {
    /// The backend error behind this failure, if there is one.
    pub fn as_api_error(&self) -> Option<&core_api::ApiError> {
        match self {
            CoreError::Auth(error) => error.as_api_error(),
            CoreError::Content(core_content::ContentError::Api(error)) => Some(error),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
