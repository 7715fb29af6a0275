use core_api::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    /// The backend call failed; matches the untouched `ApiError`.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid pagination: page {page}, limit {limit} (both start at 1)")]
    InvalidPage { page: u32, limit: u32 },
}

impl ContentError {
    /// HTTP status of a rejected call, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ContentError::Api(error) => error.status(),
            ContentError::InvalidPage { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContentError>;
