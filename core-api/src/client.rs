//! # API Client
//!
//! Sends [`RequestDescriptor`]s to one backend through the injected
//! `HttpClient` bridge.
//!
//! ## Pipeline
//!
//! 1. default headers are merged under the request's own headers
//! 2. `on_request` of every interceptor, in registration order
//! 3. one transport call; non-2xx statuses become [`ApiError`]s
//! 4. `on_response` of every interceptor, in registration order
//!
//! ## Usage
//!
//! ```ignore
//! use core_api::{ApiClient, DefaultHeaders, QueryParams};
//!
//! let client = ApiClient::builder(http_client, "https://api.example.com/api")
//!     .default_headers(DefaultHeaders::new())
//!     .build()?;
//!
//! let page: serde_json::Value = client
//!     .get_json("/exercise", Some(QueryParams::page(1, 20)))
//!     .await?;
//! ```

use crate::error::{ApiError, Result};
use crate::interceptor::Interceptor;
use crate::query::QueryParams;
use crate::request::{DefaultHeaders, RequestDescriptor};
use bridge_traits::{HttpClient, HttpRequest, HttpResponse};
use core_runtime::config::ApiSettings;
use core_runtime::logging::redact_if_sensitive;
use futures::future::{BoxFuture, FutureExt};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};
use url::Url;

/// HTTP client bound to one backend base URL.
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    default_headers: DefaultHeaders,
    interceptors: Vec<Arc<dyn Interceptor>>,
    timeout: Option<Duration>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("interceptors", &self.interceptors.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiClient {
    pub fn builder(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder {
            http,
            base_url: base_url.into(),
            default_headers: None,
            interceptors: Vec::new(),
            timeout: None,
        }
    }

    /// Builder pre-filled with the base URL and timeout of `settings`.
    pub fn builder_from_settings(
        http: Arc<dyn HttpClient>,
        settings: &ApiSettings,
    ) -> ApiClientBuilder {
        Self::builder(http, settings.api_url.clone()).timeout(settings.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared default headers; updates are seen by the next request.
    pub fn default_headers(&self) -> &DefaultHeaders {
        &self.default_headers
    }

    /// Runs one request through the full interceptor pipeline.
    ///
    /// Returns a boxed future because interceptors may call back into the
    /// client while handling a response.
    pub fn execute(&self, mut request: RequestDescriptor) -> BoxFuture<'_, Result<HttpResponse>> {
        async move {
            request.apply_defaults(&self.default_headers.snapshot());

            for interceptor in &self.interceptors {
                interceptor.on_request(&mut request);
            }

            let mut outcome = self.dispatch(&request).await;

            for interceptor in &self.interceptors {
                outcome = interceptor.on_response(self, &mut request, outcome).await;
            }

            outcome
        }
        .boxed()
    }

    /// Sends the descriptor as-is, with no interceptors involved.
    async fn dispatch(&self, request: &RequestDescriptor) -> Result<HttpResponse> {
        let url = self.resolve_url(request)?;

        debug!(method = %request.method, path = %request.path, retry = request.is_retry(), "Sending request");
        for (name, value) in request.headers() {
            trace!(header = %name, value = %redact_if_sensitive(name, value), "Request header");
        }

        let mut http_request = HttpRequest::new(request.method, url);
        http_request.headers = request.headers().clone();
        http_request.body = request.body.clone();
        http_request.timeout = self.timeout;

        let response = self.http.execute(http_request).await.map_err(|e| {
            warn!(method = %request.method, path = %request.path, error = %e, "Transport failure");
            ApiError::from(e)
        })?;

        debug!(method = %request.method, path = %request.path, status = response.status, "Response received");

        if response.is_success() {
            return Ok(response);
        }

        let body = String::from_utf8_lossy(&response.body).into_owned();
        if response.status == 401 {
            Err(ApiError::Unauthorized { body })
        } else {
            Err(ApiError::Status {
                status: response.status,
                body,
            })
        }
    }

    fn resolve_url(&self, request: &RequestDescriptor) -> Result<String> {
        let path = request.path.trim_start_matches('/');
        let mut url = format!("{}/{}", self.base_url, path);

        if !request.query.is_empty() {
            url.push('?');
            url.push_str(&request.query.encode());
        }

        Url::parse(&url)
            .map(String::from)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", url, e)))
    }

    pub async fn get(&self, path: &str, query: Option<QueryParams>) -> Result<HttpResponse> {
        let request = RequestDescriptor::get(path).query(query.unwrap_or_default());
        self.execute(request).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpResponse> {
        self.execute(RequestDescriptor::post(path).json(body)?).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpResponse> {
        self.execute(RequestDescriptor::patch(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<HttpResponse> {
        self.execute(RequestDescriptor::delete(path)).await
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<QueryParams>,
    ) -> Result<T> {
        decode(&self.get(path, query).await?)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(&self.post(path, body).await?)
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(&self.patch(path, body).await?)
    }
}

/// Decodes a JSON response body.
pub fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|e| {
        ApiError::Serialization(format!(
            "Failed to decode response body (status {}): {}",
            response.status, e
        ))
    })
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    http: Arc<dyn HttpClient>,
    base_url: String,
    default_headers: Option<DefaultHeaders>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    /// Shares an existing header set instead of creating a fresh one.
    pub fn default_headers(mut self, headers: DefaultHeaders) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Appends an interceptor; order of calls is the order of execution.
    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// # Errors
    ///
    /// `ApiError::InvalidUrl` if the base URL is not absolute.
    pub fn build(self) -> Result<ApiClient> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        Ok(ApiClient {
            http: self.http,
            base_url,
            default_headers: self.default_headers.unwrap_or_default(),
            interceptors: self.interceptors,
            timeout: self.timeout,
        })
    }
}
