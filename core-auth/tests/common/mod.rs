//! Shared fixtures for the session integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{Navigator, SecureStore};
use core_api::testing::ScriptedHttpClient;
use core_auth::SessionContext;
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const API_URL: &str = "https://api.test/api";

/// Durable storage stand-in that outlives any one `SessionContext`.
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn with_pair(access_token: &str, refresh_token: &str) -> Self {
        let store = Self::default();
        store.put("accessToken", access_token);
        store.put("refreshToken", refresh_token);
        store
    }

    pub fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.as_bytes().to_vec());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .map(|value| String::from_utf8(value.clone()).unwrap())
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.entries.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl SecureStore for InMemoryStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Records navigation targets instead of opening a browser.
#[derive(Default)]
pub struct RecordingNavigator {
    pub visited: Mutex<Vec<String>>,
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate(&self, url: &str) -> BridgeResult<()> {
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub http: Arc<ScriptedHttpClient>,
    pub store: Arc<InMemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub events: EventBus,
    pub context: SessionContext,
}

pub struct HarnessBuilder {
    store: InMemoryStore,
    latency: Option<Duration>,
    single_flight: bool,
    google: bool,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::default(),
            latency: None,
            single_flight: false,
            google: false,
        }
    }

    pub fn stored_pair(mut self, access_token: &str, refresh_token: &str) -> Self {
        self.store = InMemoryStore::with_pair(access_token, refresh_token);
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn single_flight(mut self) -> Self {
        self.single_flight = true;
        self
    }

    pub fn google(mut self) -> Self {
        self.google = true;
        self
    }

    pub fn build(self) -> Harness {
        let mut http = ScriptedHttpClient::new();
        if let Some(latency) = self.latency {
            http = http.with_latency(latency);
        }
        let http = Arc::new(http);
        let store = Arc::new(self.store);
        let navigator = Arc::new(RecordingNavigator::default());
        let events = EventBus::new(64);

        let mut builder = CoreConfig::builder()
            .api_url(API_URL)
            .single_flight_refresh(self.single_flight)
            .http_client(http.clone())
            .secure_store(store.clone())
            .navigator(navigator.clone());
        if self.google {
            builder = builder.google_oauth("client-123", "http://localhost:8080/auth/google/callback");
        }
        let config = builder.build().unwrap();

        let context = SessionContext::new(&config, events.clone()).unwrap();

        Harness {
            http,
            store,
            navigator,
            events,
            context,
        }
    }
}
