//! HTTP Basic authentication for the admin dashboard.
//!
//! Credentials come from [`AdminConfig`]. Both the username and the password
//! are compared in constant time: each side is hashed with SHA-256 so the
//! comparison always runs over 32 bytes, and the two results are combined
//! without short-circuiting.
//!
//! # Usage
//!
//! ```rust,ignore
//! async fn admin_handler(admin: AdminUser) -> impl IntoResponse {
//!     format!("Hello, {}!", admin.username)
//! }
//! ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::json;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::config::AdminConfig;
use crate::server::handlers::AppState;

/// Realm advertised in the `WWW-Authenticate` challenge.
pub const BASIC_REALM: &str = "Basic";

/// Admin credentials checked against every dashboard request.
#[derive(Clone)]
pub struct AdminCredentials {
    username_hash: [u8; 32],
    password_hash: [u8; 32],
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

impl AdminCredentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username_hash: digest(username),
            password_hash: digest(password),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(&config.username, &config.password)
    }

    /// Constant-time check of a username/password pair.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = self.username_hash[..].ct_eq(&digest(username)[..]);
        let pass_ok = self.password_hash[..].ct_eq(&digest(password)[..]);
        (user_ok & pass_ok).into()
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials").finish_non_exhaustive()
    }
}

/// Decode an `Authorization: Basic ...` header value into `(username, password)`.
pub fn parse_basic_auth(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}

/// Rejection for missing or wrong admin credentials.
#[derive(Debug)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect credentials" })),
        )
            .into_response();
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static(BASIC_REALM),
        );
        response
    }
}

/// Extractor for requests carrying valid admin credentials.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (username, password) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_basic_auth)
            .ok_or(AuthRejection)?;

        if !state.admin.verify(&username, &password) {
            warn!("Rejected dashboard login for username={}", username);
            return Err(AuthRejection);
        }

        Ok(AdminUser { username })
    }
}
