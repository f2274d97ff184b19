use crate::{
    api::{
        auth::{
            password::{hash_password, verify_password},
            session::session_cookie,
            token::{self, now_unix_seconds},
            AuthConfig,
        },
        error::{ApiError, ErrorResponse},
    },
    store::DynStore,
};
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

const MISSING_FIELDS: &str = "Missing required fields";
// Same message for unknown accounts and wrong passwords.
const INVALID_CREDENTIALS: &str = "Invalid credentials";
const TOKEN_FAILED: &str = "Failed to generate token";

// Verified against when no account matches, so both failures cost one bcrypt run.
static PLACEHOLDER_HASH: OnceCell<Option<String>> = OnceCell::const_new();

async fn placeholder_hash(cost: u32) -> Option<&'static str> {
    PLACEHOLDER_HASH
        .get_or_init(|| async move {
            match hash_password(ulid::Ulid::new().to_string(), cost).await {
                Ok(hash) => Some(hash),
                Err(err) => {
                    warn!("Failed to prepare placeholder hash: {err:#}");
                    None
                }
            }
        })
        .await
        .as_deref()
}

#[derive(ToSchema, Serialize, Deserialize, Default)]
pub struct UserLogin {
    #[serde(default, rename = "username-or-email")]
    username_or_email: String,
    #[serde(default)]
    password: String,
}

impl std::fmt::Debug for UserLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLogin")
            .field("username_or_email", &self.username_or_email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: String,
}

#[utoipa::path(
    post,
    path= "/api/login",
    request_body(content = UserLogin, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 200, description = "Login successful, token also set as the Authorization cookie", body = TokenResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Signing secret missing or token signing failed", body = ErrorResponse),
    ),
    tag= "login"
)]
#[instrument(skip(store, auth_config))]
pub async fn login(
    store: Extension<DynStore>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Form<UserLogin>>,
) -> Result<(StatusCode, HeaderMap, Json<TokenResponse>), ApiError> {
    let Some(Form(login)) = payload else {
        return Err(ApiError::Validation(MISSING_FIELDS));
    };

    if login.username_or_email.is_empty() || login.password.is_empty() {
        return Err(ApiError::Validation(MISSING_FIELDS));
    }

    let candidates = store
        .find_by_login(&login.username_or_email)
        .await
        .map_err(|e| ApiError::persistence("Failed to verify credentials", e))?;

    if candidates.is_empty() {
        debug!("User not found");
        if let Some(hash) = placeholder_hash(auth_config.bcrypt_cost()).await {
            verify_password(login.password, hash.to_string()).await;
        }
        return Err(ApiError::Authentication(INVALID_CREDENTIALS));
    }

    // The identifier may be one account's username and another's mail.
    let mut authenticated = None;
    for candidate in candidates {
        if verify_password(login.password.clone(), candidate.password_hash.clone()).await {
            authenticated = Some(candidate);
            break;
        }
        debug!(user_id = candidate.id, "Password mismatch");
    }

    let Some(user) = authenticated else {
        return Err(ApiError::Authentication(INVALID_CREDENTIALS));
    };

    let Some(secret) = auth_config.secret() else {
        return Err(ApiError::Configuration("Server configuration error"));
    };

    let token = token::issue(
        user.id,
        secret,
        now_unix_seconds(),
        auth_config.token_ttl_seconds(),
    )
    .map_err(|e| ApiError::internal(TOKEN_FAILED, e))?;

    let cookie =
        session_cookie(&auth_config, &token).map_err(|e| ApiError::internal(TOKEN_FAILED, e))?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    info!(user_id = user.id, "Login successful");

    Ok((StatusCode::OK, headers, Json(TokenResponse { token })))
}
