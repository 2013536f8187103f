//! HTTP Basic gate for the admin API.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use link_core::{LinkConfigSnapshot, LinkError, LinkResult};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::LinkAxumState;

const REALM: &str = "Basic realm=\"Restricted Area\"";

/// Admin credentials, or nothing when the API is left open.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthConfig {
    Disabled,
    Basic { username: String, password: String },
}

impl AuthConfig {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read `auth.username` / `auth.password`. Empty values count as unset;
    /// setting only one of the two is refused.
    pub fn from_config(config: &LinkConfigSnapshot) -> LinkResult<Self> {
        let username = config.get("auth.username").filter(|v| !v.is_empty());
        let password = config.get("auth.password").filter(|v| !v.is_empty());

        match (username, password) {
            (None, None) => Ok(Self::Disabled),
            (Some(username), Some(password)) => Ok(Self::basic(username, password)),
            _ => Err(LinkError::general_error(
                "Both auth.username and auth.password must be set",
            )
            .into_anyhow()),
        }
    }

    /// Why `headers` are not acceptable, if they are not.
    pub fn check(&self, headers: &HeaderMap) -> Result<(), &'static str> {
        let Self::Basic { username, password } = self else {
            return Ok(());
        };

        let value = headers
            .get(header::AUTHORIZATION)
            .ok_or("Unauthorized")?
            .to_str()
            .map_err(|_| "Invalid Authorization Scheme")?;

        let mut parts = value.split(' ');
        let (scheme, encoded) = (parts.next(), parts.next());
        let encoded = match (scheme, encoded) {
            (Some("Basic"), Some(encoded)) if !encoded.is_empty() => encoded,
            _ => return Err("Invalid Authorization Scheme"),
        };

        let decoded = STANDARD
            .decode(encoded)
            .map_err(|_| "Invalid Credentials Format")?;
        let colon = decoded
            .iter()
            .position(|b| *b == b':')
            .ok_or("Invalid Credentials Format")?;
        let (given_user, given_pass) = (&decoded[..colon], &decoded[colon + 1..]);

        // Evaluate both halves before branching.
        let user_ok = given_user.ct_eq(username.as_bytes());
        let pass_ok = given_pass.ct_eq(password.as_bytes());
        if bool::from(user_ok & pass_ok) {
            Ok(())
        } else {
            Err("Invalid Username or Password")
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

fn unauthorized(message: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, REALM)],
        message,
    )
        .into_response()
}

/// Middleware for everything under `/api`.
pub async fn require_auth(State(state): State<LinkAxumState>, request: Request, next: Next) -> Response {
    if state.auth() == &AuthConfig::Disabled {
        warn!("no admin credentials configured, skipping authentication");
        return next.run(request).await;
    }

    match state.auth().check(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(message) => unauthorized(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use link_core::LinkConfig;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn basic(user_pass: &str) -> HeaderMap {
        headers_with(&format!("Basic {}", STANDARD.encode(user_pass)))
    }

    #[test]
    fn disabled_accepts_anything() {
        assert_eq!(AuthConfig::Disabled.check(&HeaderMap::new()), Ok(()));
    }

    #[test]
    fn basic_credentials_are_checked() {
        let auth = AuthConfig::basic("admin", "s3cret:with:colons");
        assert_eq!(auth.check(&basic("admin:s3cret:with:colons")), Ok(()));
        assert_eq!(auth.check(&basic("admin:nope")), Err("Invalid Username or Password"));
        assert_eq!(auth.check(&basic("adm:s3cret:with:colons")), Err("Invalid Username or Password"));
    }

    #[test]
    fn malformed_headers_get_specific_messages() {
        let auth = AuthConfig::basic("admin", "pw");
        assert_eq!(auth.check(&HeaderMap::new()), Err("Unauthorized"));
        assert_eq!(auth.check(&headers_with("Bearer abc")), Err("Invalid Authorization Scheme"));
        assert_eq!(auth.check(&headers_with("Basic")), Err("Invalid Authorization Scheme"));
        assert_eq!(
            auth.check(&headers_with(&format!("Basic {}", STANDARD.encode("nocolon")))),
            Err("Invalid Credentials Format")
        );
    }

    #[test]
    fn half_configured_credentials_are_rejected() {
        let mut config = LinkConfig::new();
        config.set("auth.username", "admin");
        let err = AuthConfig::from_config(&config.snapshot()).unwrap_err();
        assert!(err.to_string().contains("auth.password"));

        config.set("auth.password", "pw");
        assert_eq!(
            AuthConfig::from_config(&config.snapshot()).unwrap(),
            AuthConfig::basic("admin", "pw")
        );
        assert_eq!(
            AuthConfig::from_config(&LinkConfig::new().snapshot()).unwrap(),
            AuthConfig::Disabled
        );
    }
}
