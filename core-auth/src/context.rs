//! # Session Context
//!
//! One explicitly constructed owner of the client, the session and the
//! Session API. Build it once at startup and hand clones of its `Arc`s to
//! whatever issues requests; nothing here is process-global.
//!
//! Construction order matters: the default headers exist before the session
//! so the session can write the bearer into them, and the interceptor exists
//! before the client so every request passes through it.

use crate::error::Result;
use crate::interceptor::AuthInterceptor;
use crate::manager::AuthManager;
use crate::session::SessionState;
use crate::token_store::TokenStore;
use core_api::{ApiClient, DefaultHeaders};
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use std::sync::Arc;
use tracing::info;

pub struct SessionContext {
    client: Arc<ApiClient>,
    session: Arc<SessionState>,
    auth: AuthManager,
}

impl SessionContext {
    /// Wires client, session and Session API from a validated config.
    ///
    /// The session starts empty; call [`initialize`](Self::initialize) to
    /// restore stored tokens.
    pub fn new(config: &CoreConfig, event_bus: EventBus) -> Result<Self> {
        config.validate()?;

        // Credentials inclusion is a transport setting, applied when the
        // desktop HTTP client is created from `config.api`.
        let headers = DefaultHeaders::new();

        let session = Arc::new(SessionState::new(
            TokenStore::new(config.secure_store.clone()),
            headers.clone(),
            event_bus,
        ));

        let interceptor = AuthInterceptor::new(session.clone(), config.api.refresh_path.clone())
            .with_single_flight(config.features.single_flight_refresh);

        let client = Arc::new(
            ApiClient::builder_from_settings(config.http_client.clone(), &config.api)
                .default_headers(headers)
                .interceptor(Arc::new(interceptor))
                .build()?,
        );

        let auth = AuthManager::new(
            client.clone(),
            session.clone(),
            config.navigator.clone(),
            config.oauth.clone(),
            config.api.login_path.clone(),
        );

        info!(
            api_url = %client.base_url(),
            single_flight_refresh = config.features.single_flight_refresh,
            "Session context created"
        );

        Ok(Self {
            client,
            session,
            auth,
        })
    }

    /// Restores the stored session, if any. Call before the first request.
    pub async fn initialize(&self) -> bool {
        self.session.initialize().await
    }

    /// Authenticated client for every backend call.
    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySecureStore;
    use crate::token_store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::Navigator;
    use core_api::testing::{json_response, ScriptedHttpClient};
    use core_api::HttpMethod;
    use serde_json::json;

    struct NoopNavigator;

    #[async_trait]
    impl Navigator for NoopNavigator {
        async fn navigate(&self, _url: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn config(
        http: Arc<ScriptedHttpClient>,
        secure_store: Arc<MemorySecureStore>,
    ) -> CoreConfig {
        CoreConfig::builder()
            .api_url("https://api.test/api")
            .http_client(http)
            .secure_store(secure_store)
            .navigator(Arc::new(NoopNavigator))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_restored_token_used_on_first_request() {
        let http = Arc::new(ScriptedHttpClient::new());
        let secure_store = Arc::new(MemorySecureStore::new());
        secure_store.insert(ACCESS_TOKEN_KEY, "T1");
        secure_store.insert(REFRESH_TOKEN_KEY, "R1");
        http.enqueue(HttpMethod::Get, "/exercise", json_response(200, json!({ "data": [] })));

        let context = SessionContext::new(&config(http.clone(), secure_store), EventBus::new(8)).unwrap();
        assert!(context.initialize().await);

        context.client().get("/exercise", None).await.unwrap();

        let sent = http.requests();
        assert_eq!(sent[0].url, "https://api.test/api/exercise");
        assert_eq!(sent[0].headers.get("authorization").unwrap(), "Bearer T1");
        assert_eq!(sent[0].timeout, Some(std::time::Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_fresh_context_is_signed_out() {
        let http = Arc::new(ScriptedHttpClient::new());
        let context = SessionContext::new(
            &config(http, Arc::new(MemorySecureStore::new())),
            EventBus::new(8),
        )
        .unwrap();

        assert!(!context.initialize().await);
        assert!(!context.auth().is_authenticated());
    }
}
