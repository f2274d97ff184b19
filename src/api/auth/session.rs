//! Session cookie handling, token verification middleware and the
//! authenticated-user extractor.
//!
//! Flow Overview: `authenticate` runs before protected handlers, reads the
//! token from the `Authorization` cookie (or a bearer header), verifies it and
//! attaches an [`AuthUser`] to the request. Handlers ask for `AuthUser`, which
//! fails with 401 when nothing was attached.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, COOKIE},
        request::Parts,
        Extensions, HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
    Extension,
};
use std::sync::Arc;
use tracing::debug;

use super::{token, AuthConfig};
use crate::{api::error::ApiError, store::UserId};

pub const SESSION_COOKIE_NAME: &str = "Authorization";
const UNAUTHORIZED: &str = "Unauthorized";

/// Identity recovered from a verified session token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// Read the identity attached by [`authenticate`].
///
/// # Errors
/// Returns `ApiError::Authentication` when no identity was attached.
pub fn current_user(extensions: &Extensions) -> Result<UserId, ApiError> {
    extensions
        .get::<AuthUser>()
        .map(|user| user.user_id)
        .ok_or(ApiError::Authentication(UNAUTHORIZED))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(&parts.extensions).map(|user_id| Self { user_id })
    }
}

/// Attach an [`AuthUser`] when the request carries a valid token.
/// Requests without one continue untouched.
pub async fn authenticate(
    auth_config: Extension<Arc<AuthConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let (Some(secret), Some(raw)) = (
        auth_config.secret(),
        extract_session_token(request.headers()),
    ) {
        match token::verify(&raw, secret) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthUser {
                    user_id: claims.sub,
                });
            }
            Err(err) => debug!("Ignoring invalid session token: {err}"),
        }
    }

    next.run(request).await
}

/// Build the `HttpOnly` cookie that carries the session token.
pub fn session_cookie(
    auth_config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let max_age = auth_config.cookie_max_age_seconds();
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if auth_config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    extract_cookie_token(headers).or_else(|| extract_bearer_token(headers))
}

fn extract_cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == SESSION_COOKIE_NAME && !val.trim().is_empty())
                .then(|| val.trim().to_string())
        })
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim().to_string())
    } else {
        None
    }
}
