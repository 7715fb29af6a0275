//! Google sign-in redirect.
//!
//! The console never handles the authorization code itself: the backend's
//! callback route exchanges it and returns the user to the console. All that
//! happens here is building the consent-screen URL.

use crate::error::{AuthError, Result};
use core_runtime::config::GoogleOAuthSettings;
use url::Url;

/// Builds the Google consent-screen URL for an authorization-code flow.
///
/// ```
/// use core_auth::oauth::google_authorization_url;
/// use core_runtime::config::GoogleOAuthSettings;
///
/// let settings = GoogleOAuthSettings::new(
///     "client-123",
///     "http://localhost:8080/auth/google/callback",
/// );
/// let url = google_authorization_url(&settings).unwrap();
/// assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?response_type=code"));
/// ```
pub fn google_authorization_url(settings: &GoogleOAuthSettings) -> Result<String> {
    if settings.client_id.trim().is_empty() {
        return Err(AuthError::InvalidOAuthSettings(
            "client id is empty".to_string(),
        ));
    }

    let redirect = Url::parse(&settings.redirect_uri).map_err(|e| {
        AuthError::InvalidOAuthSettings(format!("redirect URI {}: {}", settings.redirect_uri, e))
    })?;

    let mut url = Url::parse(&settings.auth_url).map_err(|e| {
        AuthError::InvalidOAuthSettings(format!("auth URL {}: {}", settings.auth_url, e))
    })?;

    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &settings.client_id)
        .append_pair("redirect_uri", redirect.as_str())
        .append_pair("scope", &settings.scopes.join(" "));

    Ok(url.into())
}
