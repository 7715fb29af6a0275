//! Navigation Abstraction
//!
//! Lets the core hand the user off to an external page (OAuth consent screens)
//! without knowing whether it runs in a browser tab or a desktop shell.

use async_trait::async_trait;

use crate::error::Result;

/// Full-page navigation trait
///
/// - Web: assigns `window.location.href`
/// - Desktop: opens the URL in the system browser
///
/// `navigate` returns once the hand-off has been issued; it does not wait for
/// the user to come back.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Navigate the host to `url`
    async fn navigate(&self, url: &str) -> Result<()>;
}
