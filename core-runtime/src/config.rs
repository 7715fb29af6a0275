//! # Core Configuration Module
//!
//! Provides configuration management for the admin console core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds every setting and bridge dependency the core needs. It
//! enforces fail-fast validation so a misconfigured deployment is rejected at
//! startup instead of on the first request.
//!
//! ## Required Settings
//!
//! - `api_url` - Base endpoint of the REST backend (env `ADMIN_API_URL`)
//!
//! ## Bridges (with platform defaults)
//!
//! - `HttpClient` - HTTP transport (desktop default: reqwest)
//! - `SecureStore` - Token persistence (desktop default: OS keychain)
//! - `Navigator` - OAuth redirect hand-off (desktop default: system browser)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults are
//! injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .api_url("https://api.example.com/api")
//!     .google_oauth("client-id.apps.googleusercontent.com", "https://admin.example.com/auth/google/callback")
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ### Loading from the environment
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder_from_env().build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, Navigator, SecureStore};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable holding the backend base endpoint.
pub const ENV_API_URL: &str = "ADMIN_API_URL";
/// Environment variable holding the console's public mount path.
pub const ENV_BASE_PATH: &str = "ADMIN_BASE_PATH";
/// Environment variable holding the Google OAuth client id.
pub const ENV_GOOGLE_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
/// Environment variable holding the Google OAuth redirect URI.
pub const ENV_GOOGLE_REDIRECT_URI: &str = "GOOGLE_REDIRECT_URI";
/// Environment variable toggling single-flight token refresh (`1`/`true`).
pub const ENV_SINGLE_FLIGHT_REFRESH: &str = "ADMIN_SINGLE_FLIGHT_REFRESH";

const DEFAULT_BASE_PATH: &str = "/adminpanel/";
const DEFAULT_LOGIN_PATH: &str = "/auth/login-by-email";
const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Core configuration for the admin console.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// REST backend settings
    pub api: ApiSettings,

    /// Google sign-in settings; `None` disables Google login
    pub oauth: Option<GoogleOAuthSettings>,

    /// Optional behavior switches
    pub features: FeatureFlags,

    /// HTTP transport
    pub http_client: Arc<dyn HttpClient>,

    /// Durable token storage
    pub secure_store: Arc<dyn SecureStore>,

    /// Full-page navigation for OAuth redirects
    pub navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api", &self.api)
            .field("oauth", &self.oauth)
            .field("features", &self.features)
            .field("http_client", &"HttpClient { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .field("navigator", &"Navigator { ... }")
            .finish()
    }
}

/// Settings for the REST backend the console talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    /// Base endpoint every request path is appended to (e.g. `https://host/api`)
    pub api_url: String,

    /// Public mount path of the console itself (e.g. `/adminpanel/`)
    pub base_path: String,

    /// Path of the e-mail/password login endpoint
    pub login_path: String,

    /// Path of the token refresh endpoint
    pub refresh_path: String,

    /// Whether cookies set by the backend are kept and sent back
    pub with_credentials: bool,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ApiSettings {
    /// Creates settings for `api_url` with every other field at its default.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            with_credentials: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Joins a console route onto the configured base path.
    ///
    /// ```
    /// use core_runtime::config::ApiSettings;
    ///
    /// let settings = ApiSettings::new("https://api.example.com/api");
    /// assert_eq!(settings.console_path("exercises"), "/adminpanel/exercises");
    /// assert_eq!(settings.console_path("/login"), "/adminpanel/login");
    /// ```
    pub fn console_path(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.base_path.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }

    fn validate(&self) -> Result<()> {
        let api_url = self.api_url.trim();
        if api_url.is_empty() {
            return Err(Error::Config("API URL cannot be empty".to_string()));
        }

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "API URL must be absolute (http:// or https://), got '{}'",
                api_url
            )));
        }

        if !self.base_path.starts_with('/') {
            return Err(Error::Config(format!(
                "Base path must start with '/', got '{}'",
                self.base_path
            )));
        }

        for (name, path) in [
            ("login path", &self.login_path),
            ("refresh path", &self.refresh_path),
        ] {
            if !path.starts_with('/') {
                return Err(Error::Config(format!(
                    "The {} must start with '/', got '{}'",
                    name, path
                )));
            }
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Google OAuth settings used to build the consent-screen redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleOAuthSettings {
    /// Authorization endpoint
    pub auth_url: String,
    /// OAuth client id registered with Google
    pub client_id: String,
    /// Callback URL Google redirects back to
    pub redirect_uri: String,
    /// Requested scopes, joined with spaces in the URL
    pub scopes: Vec<String>,
}

impl GoogleOAuthSettings {
    /// Creates settings requesting the `email` and `profile` scopes.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: vec!["email".to_string(), "profile".to_string()],
        }
    }

    fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::Config(
                "Google OAuth client id cannot be empty".to_string(),
            ));
        }

        if self.redirect_uri.trim().is_empty() {
            return Err(Error::Config(
                "Google OAuth redirect URI cannot be empty".to_string(),
            ));
        }

        if self.scopes.is_empty() {
            return Err(Error::Config(
                "Google OAuth requires at least one scope".to_string(),
            ));
        }

        Ok(())
    }
}

/// Feature flags control optional behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    /// Serialize token refreshes so concurrent 401s share one refresh call.
    ///
    /// Off by default: every request that sees a 401 refreshes on its own.
    pub single_flight_refresh: bool,
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Creates a builder pre-populated from process environment variables.
    ///
    /// See the `ENV_*` constants for the variable names. Values set on the
    /// returned builder afterwards override the environment.
    pub fn builder_from_env() -> CoreConfigBuilder {
        CoreConfigBuilder::default().with_env(|key| std::env::var(key).ok())
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;

        if let Some(oauth) = &self.oauth {
            oauth.validate()?;
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn capability_missing(capability: &str, hint: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: format!(
            "{} implementation is required. \
             Desktop: enable the 'desktop-shims' feature to use the default adapter. \
             Other hosts: {}",
            capability, hint
        ),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(api: &ApiSettings) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_options(api.request_timeout, api.with_credentials)
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_api: &ApiSettings) -> Result<Arc<dyn HttpClient>> {
    Err(capability_missing(
        "HttpClient",
        "inject a platform HTTP adapter (fetch, URLSession, OkHttp).",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    use bridge_desktop::KeyringSecureStore;

    Ok(Arc::new(KeyringSecureStore::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    Err(capability_missing(
        "SecureStore",
        "inject durable storage (localStorage, Keychain, Keystore).",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_navigator() -> Result<Arc<dyn Navigator>> {
    use bridge_desktop::BrowserNavigator;

    Ok(Arc::new(BrowserNavigator))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_navigator() -> Result<Arc<dyn Navigator>> {
    Err(capability_missing(
        "Navigator",
        "inject a navigation adapter (window.location, web view).",
    ))
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) to validate and create the
/// final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_url: Option<String>,
    base_path: Option<String>,
    login_path: Option<String>,
    refresh_path: Option<String>,
    with_credentials: Option<bool>,
    request_timeout: Option<Duration>,
    google_client_id: Option<String>,
    google_redirect_uri: Option<String>,
    google_scopes: Option<Vec<String>>,
    features: FeatureFlags,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl CoreConfigBuilder {
    /// Fills unset fields from a variable lookup (normally `std::env::var`).
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if self.api_url.is_none() {
            self.api_url = lookup(ENV_API_URL);
        }
        if self.base_path.is_none() {
            self.base_path = lookup(ENV_BASE_PATH);
        }
        if self.google_client_id.is_none() {
            self.google_client_id = lookup(ENV_GOOGLE_CLIENT_ID);
        }
        if self.google_redirect_uri.is_none() {
            self.google_redirect_uri = lookup(ENV_GOOGLE_REDIRECT_URI);
        }
        if let Some(flag) = lookup(ENV_SINGLE_FLIGHT_REFRESH) {
            self.features.single_flight_refresh =
                matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        self
    }

    /// Sets the backend base endpoint (required).
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Sets the console's public mount path. Default: `/adminpanel/`
    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the login endpoint path. Default: `/auth/login-by-email`
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = Some(path.into());
        self
    }

    /// Sets the refresh endpoint path. Default: `/auth/refresh`
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    /// Enables or disables credential (cookie) inclusion. Default: true
    pub fn with_credentials(mut self, enabled: bool) -> Self {
        self.with_credentials = Some(enabled);
        self
    }

    /// Sets the per-request timeout. Default: 30 seconds
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Enables Google sign-in with the given client id and redirect URI.
    pub fn google_oauth(
        mut self,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        self.google_client_id = Some(client_id.into());
        self.google_redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Overrides the Google scopes. Default: `email profile`
    pub fn google_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.google_scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Enables or disables single-flight token refresh. Default: false
    pub fn single_flight_refresh(mut self, enabled: bool) -> Self {
        self.features.single_flight_refresh = enabled;
        self
    }

    /// Sets all feature flags at once.
    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Sets the HTTP client implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the secure store implementation.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Sets the navigator implementation.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the API URL is missing or any value is invalid,
    ///   or if only one of the Google client id / redirect URI is set
    /// - `Error::CapabilityMissing` if a bridge is missing and no platform
    ///   default is available
    pub fn build(self) -> Result<CoreConfig> {
        let api_url = self.api_url.ok_or_else(|| {
            Error::Config(format!(
                "API URL is required. Use .api_url() or set {}.",
                ENV_API_URL
            ))
        })?;

        let mut api = ApiSettings::new(api_url.trim_end_matches('/'));
        if let Some(base_path) = self.base_path {
            api.base_path = base_path;
        }
        if let Some(login_path) = self.login_path {
            api.login_path = login_path;
        }
        if let Some(refresh_path) = self.refresh_path {
            api.refresh_path = refresh_path;
        }
        if let Some(with_credentials) = self.with_credentials {
            api.with_credentials = with_credentials;
        }
        if let Some(timeout) = self.request_timeout {
            api.request_timeout = timeout;
        }

        let oauth = match (self.google_client_id, self.google_redirect_uri) {
            (Some(client_id), Some(redirect_uri)) => {
                let mut settings = GoogleOAuthSettings::new(client_id, redirect_uri);
                if let Some(scopes) = self.google_scopes {
                    settings.scopes = scopes;
                }
                Some(settings)
            }
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "Google OAuth needs both a client id and a redirect URI".to_string(),
                ))
            }
        };

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(&api)?,
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            None => provide_default_secure_store()?,
        };

        let navigator = match self.navigator {
            Some(navigator) => navigator,
            None => provide_default_navigator()?,
        };

        let config = CoreConfig {
            api,
            oauth,
            features: self.features,
            http_client,
            secure_store,
            navigator,
        };

        config.validate()?;

        Ok(config)
    }
}
