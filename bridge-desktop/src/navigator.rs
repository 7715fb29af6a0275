//! System browser navigation

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    navigation::Navigator,
};
use tracing::{debug, warn};

/// Opens navigation targets in the user's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserNavigator;

#[async_trait]
impl Navigator for BrowserNavigator {
    async fn navigate(&self, url: &str) -> Result<()> {
        let target = url.to_string();

        // `open::that` blocks until the launcher process has been spawned.
        tokio::task::spawn_blocking(move || open::that(&target))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Browser launch task failed: {}", e)))?
            .map_err(|e| {
                warn!(error = %e, "Failed to open browser");
                BridgeError::Io(e)
            })?;

        debug!("Opened browser for navigation");
        Ok(())
    }
}
