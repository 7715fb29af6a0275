//! # Event Bus System
//!
//! Broadcasts session lifecycle changes to any number of observers using
//! `tokio::sync::broadcast`. UI layers subscribe here instead of polling the
//! session.
//!
//! ## Overview
//!
//! - **Event Types**: `CoreEvent` wrapping domain-specific enums
//! - **EventBus**: Central broadcast channel for publishing events
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(16);
//! let mut subscriber = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Auth(AuthEvent::TokenRefreshed))
//!     .ok();
//!
//! let event = subscriber.recv().await.unwrap();
//! assert_eq!(event, CoreEvent::Auth(AuthEvent::TokenRefreshed));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber fell behind and missed `n`
//!   events. Non-fatal; keep receiving.
//! - **`RecvError::Closed`**: every sender is gone. Treat it as shutdown.
//!
//! Emitting with no subscribers returns `Err`, which publishers ignore.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published through the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Authentication and session events
    Auth(AuthEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::AuthError { .. }) => EventSeverity::Error,
            CoreEvent::Auth(AuthEvent::SignedOut {
                reason: SignOutReason::RefreshFailed,
            }) => EventSeverity::Warning,
            CoreEvent::Auth(AuthEvent::SignedIn { .. })
            | CoreEvent::Auth(AuthEvent::SignedOut { .. })
            | CoreEvent::Auth(AuthEvent::SessionRestored { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Authentication Events
// ============================================================================

/// How a session was established.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignInMethod {
    /// E-mail and password login
    Password,
    /// Account registration
    Registration,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignOutReason {
    /// Explicit logout
    UserRequested,
    /// The refresh call failed and the session was dropped
    RefreshFailed,
}

/// Session lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// Tokens found in storage at startup were loaded into the session.
    SessionRestored,
    /// A login or registration populated the session.
    SignedIn {
        /// Identifier of the signed-in user, when the backend returned one.
        user_id: Option<String>,
        method: SignInMethod,
    },
    /// A 401 triggered a refresh call.
    TokenRefreshing,
    /// The refresh call succeeded and the new pair is in place.
    TokenRefreshed,
    /// The session was cleared.
    SignedOut { reason: SignOutReason },
    /// An authentication step failed.
    AuthError {
        /// Human-readable error message.
        message: String,
        /// Whether retrying the same operation may succeed.
        recoverable: bool,
    },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::SessionRestored => "Session restored from storage",
            AuthEvent::SignedIn { .. } => "User signed in successfully",
            AuthEvent::TokenRefreshing => "Refreshing access token",
            AuthEvent::TokenRefreshed => "Access token refreshed",
            AuthEvent::SignedOut { .. } => "User signed out",
            AuthEvent::AuthError { .. } => "Authentication error",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus yields another sender on the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A subscriber that falls behind by more than `capacity` events
    /// receives `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> CoreEvent {
        CoreEvent::Auth(AuthEvent::SignedIn {
            user_id: Some("42".to_string()),
            method: SignInMethod::Password,
        })
    }

    #[tokio::test]
    async fn test_event_bus_creation() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);

        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(signed_in()).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        assert_eq!(bus.emit(signed_in()).unwrap(), 2);
        assert_eq!(sub1.recv().await.unwrap(), signed_in());
        assert_eq!(sub2.recv().await.unwrap(), signed_in());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for _ in 0..5 {
            bus.emit(CoreEvent::Auth(AuthEvent::TokenRefreshed)).ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let error_event = CoreEvent::Auth(AuthEvent::AuthError {
            message: "refresh rejected".to_string(),
            recoverable: false,
        });
        assert_eq!(error_event.severity(), EventSeverity::Error);

        let forced = CoreEvent::Auth(AuthEvent::SignedOut {
            reason: SignOutReason::RefreshFailed,
        });
        assert_eq!(forced.severity(), EventSeverity::Warning);

        let logout = CoreEvent::Auth(AuthEvent::SignedOut {
            reason: SignOutReason::UserRequested,
        });
        assert_eq!(logout.severity(), EventSeverity::Info);

        assert_eq!(
            CoreEvent::Auth(AuthEvent::TokenRefreshing).severity(),
            EventSeverity::Debug
        );
    }

    #[test]
    fn test_event_description() {
        assert_eq!(signed_in().description(), "User signed in successfully");
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&signed_in()).unwrap();
        assert!(json.contains("\"event\":\"SignedIn\""));
        assert!(json.contains("\"method\":\"password\""));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, signed_in());
    }
}
