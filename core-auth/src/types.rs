use core_api::{decode, ApiError, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Backend user identifier; numeric on the current API, text elsewhere.
///
/// ```
/// use core_auth::UserId;
///
/// let id: UserId = serde_json::from_str("42").unwrap();
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(id) => write!(f, "{}", id),
            UserId::Text(id) => f.write_str(id),
        }
    }
}

/// The signed-in user as returned by the auth endpoints.
///
/// Fields the console does not model are kept in `extra` so the record can
/// be round-tripped without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Admin flag or `ADMIN` role, whichever the backend sent.
    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or(false) || self.role.as_deref() == Some("ADMIN")
    }

    pub fn display_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(name), None) | (None, Some(name)) => Some(name.clone()),
            (None, None) => self.email.clone(),
        }
    }
}

/// Access/refresh token pair. Always persisted together.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Body of the e-mail/password login call.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of the registration call.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest {
    /// Sent as `null` when the session holds no refresh token.
    pub refresh_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokensBody {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Login, register and refresh responses.
///
/// The backend answers either `{tokens: {accessToken, refreshToken}, user}`
/// or `{accessToken, refreshToken, user}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum AuthResponse {
    Nested {
        tokens: TokensBody,
        #[serde(default)]
        user: Option<User>,
    },
    Flat {
        #[serde(flatten)]
        tokens: TokensBody,
        #[serde(default)]
        user: Option<User>,
    },
}

/// Extracts the token pair (and user, if present) from an auth response.
///
/// A response without a refresh token is rejected so that storage never
/// holds half a pair.
pub(crate) fn parse_auth_response(
    response: &HttpResponse,
) -> Result<(TokenPair, Option<User>), ApiError> {
    let (tokens, user) = match decode::<AuthResponse>(response)? {
        AuthResponse::Nested { tokens, user } | AuthResponse::Flat { tokens, user } => {
            (tokens, user)
        }
    };

    let refresh_token = tokens.refresh_token.ok_or_else(|| {
        ApiError::Serialization("auth response is missing refreshToken".to_string())
    })?;

    Ok((TokenPair::new(tokens.access_token, refresh_token), user))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MeResponse {
    Wrapped { user: User },
    Bare(User),
}

/// Extracts the user from `GET /auth/me`, wrapped in `{user}` or bare.
pub(crate) fn parse_me_response(response: &HttpResponse) -> Result<User, ApiError> {
    match decode::<MeResponse>(response)? {
        MeResponse::Wrapped { user } | MeResponse::Bare(user) => Ok(user),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_api::testing::json_response;
    use serde_json::json;

    #[test]
    fn test_nested_auth_response() {
        let response = json_response(
            200,
            json!({
                "user": { "id": 7, "email": "admin@example.com", "isAdmin": true, "deletedAt": null },
                "tokens": { "accessToken": "T1", "refreshToken": "R1" }
            }),
        );

        let (tokens, user) = parse_auth_response(&response).unwrap();
        assert_eq!(tokens, TokenPair::new("T1", "R1"));

        let user = user.unwrap();
        assert_eq!(user.id, UserId::Number(7));
        assert!(user.is_admin());
        assert!(user.extra.contains_key("deletedAt"));
    }

    #[test]
    fn test_flat_auth_response() {
        let response = json_response(
            200,
            json!({
                "accessToken": "T1",
                "refreshToken": "R1",
                "user": { "id": "u-1", "firstName": "Ada", "lastName": "Lovelace", "role": "USER" }
            }),
        );

        let (tokens, user) = parse_auth_response(&response).unwrap();
        assert_eq!(tokens.access_token, "T1");

        let user = user.unwrap();
        assert_eq!(user.display_name().as_deref(), Some("Ada Lovelace"));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_refresh_response_without_user() {
        let response = json_response(
            200,
            json!({ "tokens": { "accessToken": "T2", "refreshToken": "R2" } }),
        );

        let (tokens, user) = parse_auth_response(&response).unwrap();
        assert_eq!(tokens, TokenPair::new("T2", "R2"));
        assert!(user.is_none());
    }

    #[test]
    fn test_missing_refresh_token_rejected() {
        let response = json_response(200, json!({ "accessToken": "T1", "user": { "id": 1 } }));
        assert!(matches!(
            parse_auth_response(&response),
            Err(ApiError::Serialization(_))
        ));
    }

    #[test]
    fn test_unrelated_body_rejected() {
        let response = json_response(200, json!({ "message": "ok" }));
        assert!(parse_auth_response(&response).is_err());
    }

    #[test]
    fn test_me_response_shapes() {
        let wrapped = json_response(200, json!({ "user": { "id": 1, "email": "a@b.c" } }));
        assert_eq!(parse_me_response(&wrapped).unwrap().id, UserId::Number(1));

        let bare = json_response(200, json!({ "id": 2, "email": "a@b.c" }));
        assert_eq!(parse_me_response(&bare).unwrap().id, UserId::Number(2));
    }

    #[test]
    fn test_secrets_not_in_debug_output() {
        let pair = format!("{:?}", TokenPair::new("T1", "R1"));
        assert!(!pair.contains("T1") && !pair.contains("R1"));

        let login = LoginRequest {
            email: "admin@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", login).contains("hunter2"));
    }

    #[test]
    fn test_refresh_request_serializes_null() {
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: None,
        })
        .unwrap();
        assert_eq!(body, json!({ "refreshToken": null }));
    }
}
