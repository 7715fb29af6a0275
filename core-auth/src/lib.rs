//! # Authentication Module
//!
//! Session and token lifecycle for the admin console.
//!
//! ## Overview
//!
//! - [`TokenStore`]: the only path to the persisted access/refresh pair
//! - [`SessionState`]: in-memory session, kept in step with storage and the
//!   client's default `Authorization` header
//! - [`AuthInterceptor`]: attaches the bearer token and turns a first 401
//!   into one refresh plus one replay
//! - [`AuthManager`]: login, registration, Google redirect, logout
//! - [`SessionContext`]: builds and owns all of the above for one backend
//!
//! ## Startup
//!
//! ```ignore
//! let context = SessionContext::new(&config, event_bus)?;
//! context.initialize().await;
//!
//! let exercises = context.client().get("/exercise", None).await?;
//! ```

pub mod context;
pub mod error;
pub mod interceptor;
pub mod manager;
pub mod oauth;
pub mod session;
pub mod token_store;
pub mod types;

#[cfg(test)]
mod testing;

pub use context::SessionContext;
pub use error::{AuthError, Result};
pub use interceptor::AuthInterceptor;
pub use manager::AuthManager;
pub use oauth::google_authorization_url;
pub use session::{Session, SessionState};
pub use token_store::TokenStore;
pub use types::{LoginRequest, RegisterRequest, TokenPair, User, UserId};
