//! # Host Bridge Traits
//!
//! The three capabilities the admin console core cannot provide on its own.
//!
//! | Trait | Used by | Desktop adapter |
//! |-------|---------|-----------------|
//! | [`HttpClient`] | `core-api` sends every request through it | `ReqwestHttpClient` |
//! | [`SecureStore`] | `core-auth` persists the token pair | `KeyringSecureStore` |
//! | [`Navigator`] | `core-auth` hands off to Google sign-in | `BrowserNavigator` |
//!
//! Hosts other than the desktop (a browser build, a test harness) implement
//! these directly and inject them through `CoreConfig`.
//!
//! All traits are `Send + Sync` so one adapter can sit behind an `Arc` shared
//! by every task. Failures use [`BridgeError`]; adapters translate their
//! native errors and keep secrets out of the messages.
//!
//! ```ignore
//! use async_trait::async_trait;
//! use bridge_traits::error::Result;
//! use bridge_traits::Navigator;
//!
//! struct WindowLocation;
//!
//! #[async_trait]
//! impl Navigator for WindowLocation {
//!     async fn navigate(&self, url: &str) -> Result<()> {
//!         set_location_href(url);
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod http;
pub mod navigation;
pub mod storage;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use navigation::Navigator;
pub use storage::SecureStore;
