//! Token Storage
//!
//! Durable persistence of the access/refresh token pair through the
//! `SecureStore` bridge.
//!
//! ## Guarantees
//!
//! - Both keys are written and removed together; a reader never observes
//!   one without the other
//! - A pair found half-present (crash between writes, external tampering)
//!   is treated as corrupted, erased and reported as absent
//! - Read failures surface as "no tokens", never as a crash
//! - Token values are never logged
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{TokenPair, TokenStore};
//! use std::sync::Arc;
//! # use bridge_traits::SecureStore;
//! # async fn example(secure_store: Arc<dyn SecureStore>) -> core_auth::Result<()> {
//! let token_store = TokenStore::new(secure_store);
//!
//! token_store.write(&TokenPair::new("T1", "R1")).await?;
//! assert!(token_store.read().await.is_some());
//!
//! token_store.clear().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::TokenPair;
use bridge_traits::SecureStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Choke point for every read and write of the persisted token pair.
pub struct TokenStore {
    secure_store: Arc<dyn SecureStore>,
    // Serializes read/write/clear so the two-key update looks atomic.
    guard: Mutex<()>,
}

impl TokenStore {
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        Self {
            secure_store,
            guard: Mutex::new(()),
        }
    }

    /// Persists both tokens, replacing any previous pair.
    ///
    /// If the second key cannot be written the first one is removed again,
    /// leaving storage empty rather than inconsistent.
    pub async fn write(&self, tokens: &TokenPair) -> Result<()> {
        let _guard = self.guard.lock().await;

        self.secure_store
            .set_secret(ACCESS_TOKEN_KEY, tokens.access_token.as_bytes())
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to store access token");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        if let Err(e) = self
            .secure_store
            .set_secret(REFRESH_TOKEN_KEY, tokens.refresh_token.as_bytes())
            .await
        {
            warn!(error = %e, "Failed to store refresh token, rolling back access token");
            self.erase_both().await;
            return Err(AuthError::SecureStorageUnavailable(e.to_string()));
        }

        info!("Token pair stored");
        Ok(())
    }

    /// Returns the stored pair, or `None` if absent, partial or unreadable.
    pub async fn read(&self) -> Option<TokenPair> {
        let _guard = self.guard.lock().await;

        let access_token = self.read_key(ACCESS_TOKEN_KEY).await?;
        let refresh_token = self.read_key(REFRESH_TOKEN_KEY).await?;

        match (access_token, refresh_token) {
            (Some(access_token), Some(refresh_token)) => {
                debug!("Token pair loaded from storage");
                Some(TokenPair {
                    access_token,
                    refresh_token,
                })
            }
            (None, None) => {
                debug!("No tokens in storage");
                None
            }
            (access_token, refresh_token) => {
                warn!(
                    has_access_token = access_token.is_some(),
                    has_refresh_token = refresh_token.is_some(),
                    "Incomplete token pair in storage, discarding"
                );
                self.erase_both().await;
                None
            }
        }
    }

    /// Removes both tokens. Succeeds when nothing is stored.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.guard.lock().await;

        let access = self.secure_store.delete_secret(ACCESS_TOKEN_KEY).await;
        let refresh = self.secure_store.delete_secret(REFRESH_TOKEN_KEY).await;

        match access.and(refresh) {
            Ok(()) => {
                info!("Token pair cleared");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to clear tokens from secure storage");
                Err(AuthError::SecureStorageUnavailable(e.to_string()))
            }
        }
    }

    /// `None` means the read failed; `Some(None)` means the key is absent.
    async fn read_key(&self, key: &str) -> Option<Option<String>> {
        match self.secure_store.get_secret(key).await {
            Ok(None) => Some(None),
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(value) if !value.is_empty() => Some(Some(value)),
                Ok(_) => Some(None),
                Err(_) => {
                    warn!(key, "Stored token is not valid UTF-8, ignoring");
                    Some(None)
                }
            },
            Err(e) => {
                warn!(key, error = %e, "Failed to read token from secure storage");
                None
            }
        }
    }

    async fn erase_both(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.secure_store.delete_secret(key).await {
                warn!(key, error = %e, "Failed to erase token");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySecureStore;

    #[tokio::test]
    async fn test_write_and_read_pair() {
        let secure_store = Arc::new(MemorySecureStore::new());
        let token_store = TokenStore::new(secure_store.clone());

        token_store.write(&TokenPair::new("T1", "R1")).await.unwrap();

        assert_eq!(token_store.read().await, Some(TokenPair::new("T1", "R1")));
        assert_eq!(secure_store.value(ACCESS_TOKEN_KEY).as_deref(), Some("T1"));
        assert_eq!(secure_store.value(REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_old_pair() {
        let secure_store = Arc::new(MemorySecureStore::new());
        let token_store = TokenStore::new(secure_store.clone());

        token_store.write(&TokenPair::new("T1", "R1")).await.unwrap();
        token_store.write(&TokenPair::new("T2", "R2")).await.unwrap();

        assert_eq!(token_store.read().await, Some(TokenPair::new("T2", "R2")));
    }

    #[tokio::test]
    async fn test_read_empty_store() {
        let token_store = TokenStore::new(Arc::new(MemorySecureStore::new()));
        assert_eq!(token_store.read().await, None);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let secure_store = Arc::new(MemorySecureStore::new());
        let token_store = TokenStore::new(secure_store.clone());

        token_store.write(&TokenPair::new("T1", "R1")).await.unwrap();
        token_store.clear().await.unwrap();
        token_store.clear().await.unwrap();

        assert!(secure_store.is_empty());
        assert_eq!(token_store.read().await, None);
    }

    #[tokio::test]
    async fn test_failed_second_write_rolls_back() {
        let secure_store = Arc::new(MemorySecureStore::new());
        let token_store = TokenStore::new(secure_store.clone());
        token_store.write(&TokenPair::new("T1", "R1")).await.unwrap();

        secure_store.fail_writes_for(REFRESH_TOKEN_KEY);
        let result = token_store.write(&TokenPair::new("T2", "R2")).await;

        assert!(matches!(result, Err(AuthError::SecureStorageUnavailable(_))));
        assert!(!secure_store.contains(ACCESS_TOKEN_KEY));
        assert!(!secure_store.contains(REFRESH_TOKEN_KEY));
    }

    #[tokio::test]
    async fn test_partial_pair_is_discarded() {
        let secure_store = Arc::new(MemorySecureStore::new());
        secure_store.insert(ACCESS_TOKEN_KEY, "T1");

        let token_store = TokenStore::new(secure_store.clone());
        assert_eq!(token_store.read().await, None);
        assert!(secure_store.is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_reports_no_tokens() {
        let secure_store = Arc::new(MemorySecureStore::new());
        secure_store.insert(ACCESS_TOKEN_KEY, "T1");
        secure_store.insert(REFRESH_TOKEN_KEY, "R1");
        secure_store.fail_reads(true);

        let token_store = TokenStore::new(secure_store.clone());
        assert_eq!(token_store.read().await, None);

        // Unreadable is not the same as corrupted: nothing is erased.
        secure_store.fail_reads(false);
        assert_eq!(token_store.read().await, Some(TokenPair::new("T1", "R1")));
    }
}
