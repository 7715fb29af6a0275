//! Outgoing request descriptor and shared default headers.

use crate::error::Result;
use crate::query::QueryParams;
use bridge_traits::HttpMethod;
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Header names are stored lower-cased.
pub const AUTHORIZATION: &str = "authorization";
pub const CONTENT_TYPE: &str = "content-type";

const JSON: &str = "application/json";

/// Formats a bearer header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Mutable description of a request that has not been sent yet.
///
/// Interceptors adjust it in place. The retry marker is local to one
/// descriptor and can be set once.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    /// Path relative to the client's base URL, e.g. `/exercise/5`
    pub path: String,
    headers: HashMap<String, String>,
    pub query: QueryParams,
    pub body: Option<Bytes>,
    retry: bool,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            query: QueryParams::new(),
            body: None,
            retry: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Serializes `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(Bytes::from(serde_json::to_vec(body)?));
        self.set_header(CONTENT_TYPE, JSON);
        Ok(self)
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.set_bearer(token);
        self
    }

    /// Builder form of [`mark_retry`](Self::mark_retry).
    pub fn retried(mut self) -> Self {
        self.retry = true;
        self
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(&name.to_ascii_lowercase())
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn set_bearer(&mut self, token: &str) {
        self.set_header(AUTHORIZATION, bearer(token));
    }

    /// Token carried in the `Authorization` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.header_value(AUTHORIZATION)
            .and_then(|value| value.strip_prefix("Bearer "))
    }

    /// Sets the retry marker. Returns `true` only on the first call.
    pub fn mark_retry(&mut self) -> bool {
        !std::mem::replace(&mut self.retry, true)
    }

    pub fn is_retry(&self) -> bool {
        self.retry
    }

    /// Fills in every default header the request does not set itself.
    pub(crate) fn apply_defaults(&mut self, defaults: &HashMap<String, String>) {
        for (name, value) in defaults {
            self.headers
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

/// Headers attached to every request of one client.
///
/// Cloning shares the underlying map, so the session can update the
/// `Authorization` default that the client reads.
#[derive(Debug, Clone)]
pub struct DefaultHeaders {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl DefaultHeaders {
    /// Starts with `Content-Type: application/json`.
    pub fn new() -> Self {
        let mut headers = HashMap::new();
        headers.insert(CONTENT_TYPE.to_string(), JSON.to_string());
        Self {
            inner: Arc::new(RwLock::new(headers)),
        }
    }

    pub fn set(&self, name: &str, value: impl Into<String>) {
        let mut headers = self.inner.write().unwrap_or_else(|e| e.into_inner());
        headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn remove(&self, name: &str) {
        let mut headers = self.inner.write().unwrap_or_else(|e| e.into_inner());
        headers.remove(&name.to_ascii_lowercase());
    }

    pub fn get(&self, name: &str) -> Option<String> {
        let headers = self.inner.read().unwrap_or_else(|e| e.into_inner());
        headers.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn set_bearer(&self, token: &str) {
        self.set(AUTHORIZATION, bearer(token));
    }

    pub fn clear_bearer(&self) {
        self.remove(AUTHORIZATION);
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for DefaultHeaders {
    fn default() -> Self {
        Self::new()
    }
}
