//! # API Client Core
//!
//! Configured request sending for the admin console backend.
//!
//! ## Overview
//!
//! - [`ApiClient`]: base URL, shared [`DefaultHeaders`], interceptor chain
//! - [`RequestDescriptor`]: the mutable request interceptors operate on,
//!   including the one-shot retry marker
//! - [`QueryParams`]: query encoding with repeated keys for arrays
//! - [`Interceptor`]: request/response hooks; authentication plugs in here
//! - [`ApiError`]: transport, 401, other status, refresh and local failures
//!
//! The transport itself is the `HttpClient` bridge; this crate never retries
//! on its own.

pub mod client;
pub mod error;
pub mod interceptor;
pub mod query;
pub mod request;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{decode, ApiClient, ApiClientBuilder};
pub use error::{ApiError, Result};
pub use interceptor::Interceptor;
pub use query::QueryParams;
pub use request::{bearer, DefaultHeaders, RequestDescriptor, AUTHORIZATION, CONTENT_TYPE};

pub use bridge_traits::{HttpMethod, HttpResponse};
