//! Core service façade and bootstrap helpers.
//!
//! This crate wires a [`CoreConfig`] (and the host bridges it carries) into
//! one [`AdminService`]: the session context, the authenticated API client
//! and the content resources, all sharing one event bus. Desktop hosts
//! enable the `desktop-shims` feature so missing bridges fall back to the
//! `bridge-desktop` adapters.

pub mod error;

pub use core_runtime::config::{CoreConfig, CoreConfigBuilder};
pub use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
pub use error::{CoreError, Result};

use core_api::ApiClient;
use core_auth::{AuthManager, SessionContext, SessionState};
use core_content::ContentClient;
use core_runtime::events::{CoreEvent, EventBus, Receiver, DEFAULT_EVENT_BUFFER_SIZE};
use std::sync::Arc;
use tracing::info;

/// Console route shown after a successful sign-in.
pub const POST_LOGIN_ROUTE: &str = "exercises";

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct AdminService {
    inner: Arc<Inner>,
}

struct Inner {
    config: CoreConfig,
    event_bus: EventBus,
    session: SessionContext,
    content: ContentClient,
}

impl AdminService {
    /// Wires every component. The session starts signed out; prefer
    /// [`bootstrap`] to also restore stored tokens.
    pub fn new(config: CoreConfig) -> Result<Self> {
        let event_bus = EventBus::new(DEFAULT_EVENT_BUFFER_SIZE);
        let session = SessionContext::new(&config, event_bus.clone())?;
        let content = ContentClient::new(session.client().clone());

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                event_bus,
                session,
                content,
            }),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.inner.config
    }

    pub fn auth(&self) -> &AuthManager {
        self.inner.session.auth()
    }

    pub fn session(&self) -> &Arc<SessionState> {
        self.inner.session.session()
    }

    /// Authenticated client for calls not covered by the content resources.
    pub fn client(&self) -> &Arc<ApiClient> {
        self.inner.session.client()
    }

    pub fn content(&self) -> &ContentClient {
        &self.inner.content
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.inner.event_bus.subscribe()
    }

    /// Console path to open after sign-in, under the configured base path.
    pub fn post_login_route(&self) -> String {
        self.inner.config.api.console_path(POST_LOGIN_ROUTE)
    }
}

/// Builds the service and restores any stored session before returning.
pub async fn bootstrap(config: CoreConfig) -> Result<AdminService> {
    let service = AdminService::new(config)?;
    let restored = service.inner.session.initialize().await;

    info!(
        api_url = %service.client().base_url(),
        restored,
        "Admin service ready"
    );
    Ok(service)
}

/// Convenience bootstrapper for desktop hosts: configuration from the
/// environment, desktop adapters for every bridge.
///
/// ```no_run
/// # #[cfg(feature = "desktop-shims")]
/// # async fn example() -> core_service::Result<()> {
/// core_service::init_logging(core_service::LoggingConfig::default())?;
///
/// let service = core_service::bootstrap_from_env().await?;
/// if !service.auth().is_authenticated() {
///     service.auth().login_with_google().await?;
/// }
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_from_env() -> Result<AdminService> {
    let config = CoreConfig::builder_from_env().build()?;
    bootstrap(config).await
}
