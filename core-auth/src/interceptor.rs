//! # Auth Interceptor
//!
//! Attaches the bearer token to outgoing requests and recovers from an
//! expired access token.
//!
//! ## Response handling
//!
//! | Outcome                          | Action                                  |
//! |----------------------------------|-----------------------------------------|
//! | success, non-401 error           | passed through                          |
//! | 401, retry marker unset          | mark, refresh once, replay once         |
//! | 401, retry marker already set    | passed through                          |
//!
//! The refresh call is sent through the same client with its own retry
//! marker pre-set, so a 401 from the refresh endpoint cannot recurse.
//!
//! On refresh failure the session is cleared and the caller receives
//! [`ApiError::RefreshFailed`] wrapping the refresh error, not the
//! original 401.
//!
//! ## Concurrency
//!
//! By default every request that sees a 401 refreshes on its own, so
//! concurrent expiries produce concurrent refresh calls. With single-flight
//! enabled refreshes are serialized, and a request whose bearer is already
//! stale by the time it gets the lock replays with the current token
//! instead of refreshing again. If that refresh failed, waiters get
//! [`ApiError::RefreshFailed`] without a second attempt. Replays run after
//! the lock is released.

use crate::session::SessionState;
use crate::types::{parse_auth_response, RefreshRequest, TokenPair, User};
use async_trait::async_trait;
use core_api::{ApiClient, ApiError, HttpResponse, Interceptor, RequestDescriptor, Result};
use core_runtime::events::{AuthEvent, SignOutReason};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

pub struct AuthInterceptor {
    session: Arc<SessionState>,
    refresh_path: String,
    refresh_lock: Option<Mutex<()>>,
}

impl AuthInterceptor {
    pub fn new(session: Arc<SessionState>, refresh_path: impl Into<String>) -> Self {
        Self {
            session,
            refresh_path: refresh_path.into(),
            refresh_lock: None,
        }
    }

    /// Serializes refreshes so concurrent 401s share one refresh call.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.refresh_lock = enabled.then(|| Mutex::new(()));
        self
    }

    #[instrument(skip(self, client, request, body), fields(method = %request.method, path = %request.path))]
    async fn refresh_and_replay(
        &self,
        client: &ApiClient,
        request: &mut RequestDescriptor,
        body: String,
    ) -> Result<HttpResponse> {
        let sent_bearer = request.bearer_token().map(str::to_owned);
        let token = {
            let _guard = match &self.refresh_lock {
                Some(lock) => Some(lock.lock().await),
                None => None,
            };
            self.settle_token(client, sent_bearer.as_deref(), body).await?
        };

        request.set_bearer(&token);
        client.execute(request.clone()).await
    }

    /// Access token the rejected request should be replayed with.
    ///
    /// Under single-flight, a request that waited on another refresh reuses
    /// its result: the new token on success, `RefreshFailed` once that
    /// refresh has signed the session out.
    async fn settle_token(
        &self,
        client: &ApiClient,
        sent_bearer: Option<&str>,
        body: String,
    ) -> Result<String> {
        if self.refresh_lock.is_some() {
            match self.session.access_token() {
                Some(current) if sent_bearer != Some(current.as_str()) => {
                    debug!("Token already refreshed by another request, replaying");
                    return Ok(current);
                }
                None if sent_bearer.is_some() => {
                    debug!("Session cleared by a failed refresh, not retrying");
                    return Err(ApiError::RefreshFailed(Box::new(ApiError::Unauthorized {
                        body,
                    })));
                }
                _ => {}
            }
        }

        self.session.emit(AuthEvent::TokenRefreshing);
        debug!("Access token rejected, refreshing");

        match self.refresh(client).await {
            Ok((tokens, user)) => {
                let user = user.or_else(|| self.session.user());
                let access_token = tokens.access_token.clone();
                self.session.set_auth_data(user, tokens).await;
                self.session.emit(AuthEvent::TokenRefreshed);
                info!("Access token refreshed, replaying request");

                Ok(access_token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, signing out");
                self.session.clear().await;
                self.session.emit(AuthEvent::SignedOut {
                    reason: SignOutReason::RefreshFailed,
                });
                self.session.emit(AuthEvent::AuthError {
                    message: e.to_string(),
                    recoverable: false,
                });

                Err(ApiError::RefreshFailed(Box::new(e)))
            }
        }
    }

    async fn refresh(&self, client: &ApiClient) -> Result<(TokenPair, Option<User>)> {
        let body = RefreshRequest {
            refresh_token: self.session.refresh_token(),
        };
        let request = RequestDescriptor::post(self.refresh_path.as_str())
            .json(&body)?
            .retried();

        let response = client.execute(request).await?;
        parse_auth_response(&response)
    }
}

#[async_trait]
impl Interceptor for AuthInterceptor {
    fn on_request(&self, request: &mut RequestDescriptor) {
        if let Some(token) = self.session.access_token() {
            request.set_bearer(&token);
        }
    }

    async fn on_response(
        &self,
        client: &ApiClient,
        request: &mut RequestDescriptor,
        outcome: Result<HttpResponse>,
    ) -> Result<HttpResponse> {
        match outcome {
            Err(ApiError::Unauthorized { body }) => {
                if request.mark_retry() {
                    self.refresh_and_replay(client, request, body).await
                } else {
                    Err(ApiError::Unauthorized { body })
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySecureStore;
    use crate::token_store::TokenStore;
    use core_api::testing::{json_response, request_json, ScriptedHttpClient};
    use core_api::{DefaultHeaders, HttpMethod};
    use core_runtime::events::{CoreEvent, EventBus};
    use serde_json::json;

    struct Harness {
        http: Arc<ScriptedHttpClient>,
        session: Arc<SessionState>,
        client: ApiClient,
    }

    async fn harness(single_flight: bool, http: ScriptedHttpClient) -> Harness {
        let http = Arc::new(http);
        let secure_store = Arc::new(MemorySecureStore::new());
        let headers = DefaultHeaders::new();
        let session = Arc::new(SessionState::new(
            TokenStore::new(secure_store),
            headers.clone(),
            EventBus::new(32),
        ));
        session.set_auth_data(None, TokenPair::new("T1", "R1")).await;

        let interceptor =
            AuthInterceptor::new(session.clone(), "/auth/refresh").with_single_flight(single_flight);
        let client = ApiClient::builder(http.clone(), "https://api.test/api")
            .default_headers(headers)
            .interceptor(Arc::new(interceptor))
            .build()
            .unwrap();

        Harness {
            http,
            session,
            client,
        }
    }

    #[tokio::test]
    async fn test_no_refresh_on_success() {
        let h = harness(false, ScriptedHttpClient::new()).await;
        h.http.enqueue(HttpMethod::Get, "/exercise/5", json_response(200, json!({ "id": 5 })));

        h.client.get("/exercise/5", None).await.unwrap();

        assert_eq!(h.http.requests().len(), 1);
        assert_eq!(
            h.http.requests()[0].headers.get("authorization").unwrap(),
            "Bearer T1"
        );
    }

    #[tokio::test]
    async fn test_non_401_error_passes_through() {
        let h = harness(false, ScriptedHttpClient::new()).await;
        h.http.enqueue(HttpMethod::Get, "/exercise/5", json_response(403, json!({})));

        let err = h.client.get("/exercise/5", None).await.unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 403, .. }));
        assert!(h.http.requests_to(HttpMethod::Post, "/auth/refresh").is_empty());
        assert!(h.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_sends_current_refresh_token() {
        let h = harness(false, ScriptedHttpClient::new()).await;
        h.http.enqueue(HttpMethod::Get, "/auth/me", json_response(401, json!({})));
        h.http.enqueue(
            HttpMethod::Post,
            "/auth/refresh",
            json_response(200, json!({ "tokens": { "accessToken": "T2", "refreshToken": "R2" } })),
        );
        h.http.enqueue(HttpMethod::Get, "/auth/me", json_response(200, json!({ "user": { "id": 1 } })));

        h.client.get("/auth/me", None).await.unwrap();

        let refreshes = h.http.requests_to(HttpMethod::Post, "/auth/refresh");
        assert_eq!(refreshes.len(), 1);
        assert_eq!(request_json(&refreshes[0]), json!({ "refreshToken": "R1" }));
    }

    #[tokio::test]
    async fn test_replay_failure_is_returned_as_is() {
        let h = harness(false, ScriptedHttpClient::new()).await;
        h.http.enqueue(HttpMethod::Get, "/exercise/5", json_response(401, json!({})));
        h.http.enqueue(
            HttpMethod::Post,
            "/auth/refresh",
            json_response(200, json!({ "tokens": { "accessToken": "T2", "refreshToken": "R2" } })),
        );
        h.http.enqueue(HttpMethod::Get, "/exercise/5", json_response(401, json!({ "message": "still no" })));

        let err = h.client.get("/exercise/5", None).await.unwrap_err();

        // The replay carries the marker, so its 401 is final.
        assert!(err.is_unauthorized());
        assert_eq!(h.http.requests_to(HttpMethod::Post, "/auth/refresh").len(), 1);
        assert_eq!(h.session.access_token().as_deref(), Some("T2"));
    }

    #[tokio::test]
    async fn test_malformed_refresh_response_signs_out() {
        let h = harness(false, ScriptedHttpClient::new()).await;
        let mut events = h.session.subscribe();
        h.http.enqueue(HttpMethod::Get, "/exercise/5", json_response(401, json!({})));
        h.http.enqueue(
            HttpMethod::Post,
            "/auth/refresh",
            json_response(200, json!({ "tokens": { "accessToken": "T2" } })),
        );

        let err = h.client.get("/exercise/5", None).await.unwrap_err();

        match err {
            ApiError::RefreshFailed(inner) => {
                assert!(matches!(*inner, ApiError::Serialization(_)))
            }
            other => panic!("Expected RefreshFailed, got {:?}", other),
        }
        assert!(!h.session.is_authenticated());

        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::TokenRefreshing)
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::SignedOut {
                reason: SignOutReason::RefreshFailed
            })
        );
    }

    #[tokio::test]
    async fn test_refresh_keeps_existing_user() {
        let h = harness(false, ScriptedHttpClient::new()).await;
        let user: User = serde_json::from_value(json!({ "id": 9, "email": "a@b.c" })).unwrap();
        h.session.set_user(Some(user.clone()));

        h.http.enqueue(HttpMethod::Get, "/module", json_response(401, json!({})));
        h.http.enqueue(
            HttpMethod::Post,
            "/auth/refresh",
            json_response(200, json!({ "tokens": { "accessToken": "T2", "refreshToken": "R2" } })),
        );
        h.http.enqueue(HttpMethod::Get, "/module", json_response(200, json!([])));

        h.client.get("/module", None).await.unwrap();

        assert_eq!(h.session.user(), Some(user));
    }

    #[tokio::test]
    async fn test_concurrent_401s_refresh_independently_by_default() {
        let http = ScriptedHttpClient::new().with_latency(std::time::Duration::from_millis(20));
        let h = harness(false, http).await;
        for path in ["/exercise/1", "/exercise/2"] {
            h.http.enqueue(HttpMethod::Get, path, json_response(401, json!({})));
            h.http.enqueue(HttpMethod::Get, path, json_response(200, json!({})));
        }
        for (access, refresh) in [("T2", "R2"), ("T3", "R3")] {
            h.http.enqueue(
                HttpMethod::Post,
                "/auth/refresh",
                json_response(
                    200,
                    json!({ "tokens": { "accessToken": access, "refreshToken": refresh } }),
                ),
            );
        }

        let (first, second) = tokio::join!(
            h.client.get("/exercise/1", None),
            h.client.get("/exercise/2", None)
        );
        assert!(first.is_ok() && second.is_ok());

        assert_eq!(h.http.requests_to(HttpMethod::Post, "/auth/refresh").len(), 2);
    }

    #[tokio::test]
    async fn test_single_flight_shares_one_refresh() {
        let http = ScriptedHttpClient::new().with_latency(std::time::Duration::from_millis(20));
        let h = harness(true, http).await;
        for path in ["/exercise/1", "/exercise/2"] {
            h.http.enqueue(HttpMethod::Get, path, json_response(401, json!({})));
            h.http.enqueue(HttpMethod::Get, path, json_response(200, json!({})));
        }
        h.http.enqueue(
            HttpMethod::Post,
            "/auth/refresh",
            json_response(200, json!({ "tokens": { "accessToken": "T2", "refreshToken": "R2" } })),
        );

        let (first, second) = tokio::join!(
            h.client.get("/exercise/1", None),
            h.client.get("/exercise/2", None)
        );
        assert!(first.is_ok() && second.is_ok());

        assert_eq!(h.http.requests_to(HttpMethod::Post, "/auth/refresh").len(), 1);
        for path in ["/exercise/1", "/exercise/2"] {
            let replay = h.http.requests_to(HttpMethod::Get, path).pop().unwrap();
            assert_eq!(replay.headers.get("authorization").unwrap(), "Bearer T2");
        }
    }

    #[tokio::test]
    async fn test_single_flight_shares_failed_refresh() {
        let http = ScriptedHttpClient::new().with_latency(std::time::Duration::from_millis(20));
        let h = harness(true, http).await;
        let mut events = h.session.subscribe();
        for path in ["/exercise/1", "/exercise/2"] {
            h.http.enqueue(HttpMethod::Get, path, json_response(401, json!({})));
        }
        h.http.enqueue(HttpMethod::Post, "/auth/refresh", json_response(401, json!({})));

        let (first, second) = tokio::join!(
            h.client.get("/exercise/1", None),
            h.client.get("/exercise/2", None)
        );

        for result in [first, second] {
            assert!(matches!(result, Err(ApiError::RefreshFailed(_))));
        }
        let refreshes = h.http.requests_to(HttpMethod::Post, "/auth/refresh");
        assert_eq!(refreshes.len(), 1);
        assert_eq!(request_json(&refreshes[0]), json!({ "refreshToken": "R1" }));
        assert_eq!(h.http.requests().len(), 3);
        assert!(!h.session.is_authenticated());

        let mut sign_outs = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, CoreEvent::Auth(AuthEvent::SignedOut { .. })) {
                sign_outs += 1;
            }
        }
        assert_eq!(sign_outs, 1);
    }
}
