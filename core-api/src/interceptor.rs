//! Request/response interception seam.

use crate::client::ApiClient;
use crate::error::Result;
use crate::request::RequestDescriptor;
use async_trait::async_trait;
use bridge_traits::HttpResponse;

/// Hooks run by [`ApiClient`] around every request it sends.
///
/// Interceptors run in registration order in both phases. The response
/// phase receives the client itself so an interceptor can issue further
/// requests (a token refresh) and replay the original one.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Adjusts the descriptor right before it is sent.
    fn on_request(&self, _request: &mut RequestDescriptor) {}

    /// Inspects or replaces the outcome of the request.
    ///
    /// The default passes the outcome through unchanged.
    async fn on_response(
        &self,
        _client: &ApiClient,
        _request: &mut RequestDescriptor,
        outcome: Result<HttpResponse>,
    ) -> Result<HttpResponse> {
        outcome
    }
}
