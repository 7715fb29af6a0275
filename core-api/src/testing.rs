//! Scripted in-process transport for tests.
//!
//! Responses are queued per `(method, path)` and handed out in order. Every
//! request is recorded so tests can assert on exactly what went over the
//! wire.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

type Scripted = Result<HttpResponse>;

/// `HttpClient` that replays queued responses.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<HashMap<(HttpMethod, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Option<Duration>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every response, letting concurrent requests overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queues a response for the next `method` request whose URL path ends
    /// with `path`.
    pub fn enqueue(&self, method: HttpMethod, path: &str, response: HttpResponse) {
        self.push(method, path, Ok(response));
    }

    /// Queues a transport failure.
    pub fn enqueue_error(&self, method: HttpMethod, path: &str, error: BridgeError) {
        self.push(method, path, Err(error));
    }

    fn push(&self, method: HttpMethod, path: &str, scripted: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(scripted);
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests received for one route.
    pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && url_path(&request.url).ends_with(path))
            .collect()
    }

    fn next_response(&self, request: &HttpRequest) -> Scripted {
        let path = url_path(&request.url);
        let mut routes = self.routes.lock().unwrap();

        // Longest matching suffix wins so `/exercise/5` beats `/5`.
        let key = routes
            .keys()
            .filter(|(method, suffix)| *method == request.method && path.ends_with(suffix.as_str()))
            .max_by_key(|(_, suffix)| suffix.len())
            .cloned();

        key.and_then(|key| routes.get_mut(&key).and_then(VecDeque::pop_front))
            .unwrap_or_else(|| {
                Err(BridgeError::OperationFailed(format!(
                    "no scripted response for {} {}",
                    request.method, path
                )))
            })
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let response = self.next_response(&request);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        response
    }
}

fn url_path(url: &str) -> String {
    Url::parse(url)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// JSON response with the given status.
pub fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
    let mut headers = HashMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());
    HttpResponse {
        status,
        headers,
        body: Bytes::from(body.to_string()),
    }
}

/// Decodes the JSON body of a recorded request.
pub fn request_json(request: &HttpRequest) -> serde_json::Value {
    request
        .body
        .as_ref()
        .map(|body| serde_json::from_slice(body).unwrap())
        .unwrap_or(serde_json::Value::Null)
}
