//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` (with a cookie store when credentials are included)
//! - `SecureStore` using the `keyring` crate
//! - `Navigator` using the `open` crate to launch the system browser
//!
//! ## Feature Flags
//!
//! - `secure-store`: Enable OS keychain integration (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{BrowserNavigator, KeyringSecureStore, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let secure_store = KeyringSecureStore::new();
//!     let navigator = BrowserNavigator;
//!
//!     // Use in core configuration
//! }
//! ```

mod http;
mod navigator;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use http::ReqwestHttpClient;
pub use navigator::BrowserNavigator;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;
