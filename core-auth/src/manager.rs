//! # Authentication Manager
//!
//! Session API used by the console screens: e-mail/password login,
//! registration, Google redirect, logout and the authentication check.
//!
//! ## Error policy
//!
//! Backend failures are returned untouched inside [`AuthError::Api`], so a
//! wrong password surfaces as the backend's own 401 or 422. Login and
//! registration are sent with the retry marker already set: a 401 there means
//! bad credentials, not an expired token, and must not trigger a refresh.
//!
//! ## Usage
//!
//! ```ignore
//! let auth = context.auth();
//!
//! auth.login("admin@example.com", "secret").await?;
//! assert!(auth.is_authenticated());
//!
//! auth.logout().await;
//! ```

use crate::error::{AuthError, Result};
use crate::oauth::google_authorization_url;
use crate::session::SessionState;
use crate::types::{parse_auth_response, parse_me_response, LoginRequest, RegisterRequest, User};
use bridge_traits::Navigator;
use core_api::{ApiClient, RequestDescriptor};
use core_runtime::config::GoogleOAuthSettings;
use core_runtime::events::{AuthEvent, SignInMethod, SignOutReason};
use core_runtime::logging::mask_email;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Path of the registration endpoint.
pub const REGISTER_PATH: &str = "/auth/register";
/// Path of the current-user endpoint.
pub const ME_PATH: &str = "/auth/me";

pub struct AuthManager {
    client: Arc<ApiClient>,
    session: Arc<SessionState>,
    navigator: Arc<dyn Navigator>,
    oauth: Option<GoogleOAuthSettings>,
    login_path: String,
}

impl AuthManager {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<SessionState>,
        navigator: Arc<dyn Navigator>,
        oauth: Option<GoogleOAuthSettings>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            client,
            session,
            navigator,
            oauth,
            login_path: login_path.into(),
        }
    }

    /// Signs in with e-mail and password.
    ///
    /// On success the session holds the returned user and token pair; on
    /// failure the session is left as it was.
    #[instrument(skip(self, email, password), fields(email = %mask_email(email)))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<User>> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = RequestDescriptor::post(self.login_path.as_str())
            .json(&body)?
            .retried();

        let response = self.client.execute(request).await?;
        let (tokens, user) = parse_auth_response(&response)?;

        self.session.set_auth_data(user.clone(), tokens).await;
        self.session.emit(AuthEvent::SignedIn {
            user_id: user.as_ref().map(|user| user.id.to_string()),
            method: SignInMethod::Password,
        });
        info!("Signed in");

        Ok(user)
    }

    /// Creates an account and signs it in.
    #[instrument(skip(self, request), fields(email = %mask_email(&request.email)))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<Option<User>> {
        let descriptor = RequestDescriptor::post(REGISTER_PATH)
            .json(request)?
            .retried();

        let response = self.client.execute(descriptor).await?;
        let (tokens, user) = parse_auth_response(&response)?;

        self.session.set_auth_data(user.clone(), tokens).await;
        self.session.emit(AuthEvent::SignedIn {
            user_id: user.as_ref().map(|user| user.id.to_string()),
            method: SignInMethod::Registration,
        });
        info!("Registered and signed in");

        Ok(user)
    }

    /// Fetches the signed-in user and stores it in the session.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User> {
        let response = self.client.get(ME_PATH, None).await?;
        let user = parse_me_response(&response)?;

        debug!(user_id = %user.id, "Current user loaded");
        self.session.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Sends the user to Google's consent screen.
    ///
    /// Returns once the navigation has been issued; the backend callback
    /// completes the sign-in.
    #[instrument(skip(self))]
    pub async fn login_with_google(&self) -> Result<()> {
        let result = self.redirect_to_google().await;
        if let Err(e) = &result {
            error!(error = %e, "Google sign-in failed");
        }
        result
    }

    async fn redirect_to_google(&self) -> Result<()> {
        let settings = self.oauth.as_ref().ok_or(AuthError::OAuthNotConfigured)?;
        let url = google_authorization_url(settings)?;

        info!("Redirecting to Google sign-in");
        self.navigator
            .navigate(&url)
            .await
            .map_err(|e| AuthError::NavigationFailed(e.to_string()))
    }

    /// Drops the session and the stored tokens. Safe to call when signed out.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let was_authenticated = self.session.is_authenticated();
        self.session.clear().await;

        if was_authenticated {
            info!("Signed out");
        } else {
            debug!("Logout without an active session");
        }
        self.session.emit(AuthEvent::SignedOut {
            reason: SignOutReason::UserRequested,
        });
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn user(&self) -> Option<User> {
        self.session.user()
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }
}
