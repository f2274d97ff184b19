use crate::{
    api::{
        auth::{password::hash_password, AuthConfig},
        error::{ApiError, ErrorResponse},
        handlers::{valid_email, MessageResponse},
    },
    store::{CreateOutcome, DynStore, NewUser},
};
use axum::{extract::Extension, http::StatusCode, Form, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

const MISSING_FIELDS: &str = "Missing required fields";
const INVALID_EMAIL: &str = "Invalid email";
const MAIL_IN_USE: &str = "Email already in use";
const USERNAME_IN_USE: &str = "Username already in use";
const CREATE_FAILED: &str = "Failed to create account";

#[derive(ToSchema, Serialize, Deserialize, Default)]
pub struct UserSignup {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    mail: String,
    #[serde(default)]
    location: Option<String>,
}

impl std::fmt::Debug for UserSignup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSignup")
            .field("username", &self.username)
            .field("password", &"***")
            .field("mail", &self.mail)
            .field("location", &self.location)
            .finish()
    }
}

#[utoipa::path(
    post,
    path= "/api/signup",
    request_body(content = UserSignup, content_type = "application/x-www-form-urlencoded"),
    responses (
        (status = 201, description = "Account created", body = MessageResponse),
        (status = 400, description = "Missing required fields or invalid email", body = ErrorResponse),
        (status = 409, description = "Email or username already in use", body = ErrorResponse),
        (status = 500, description = "Password hashing or persistence failed", body = ErrorResponse),
    ),
    tag= "signup"
)]
#[instrument(skip(store, auth_config))]
pub async fn signup(
    store: Extension<DynStore>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Form<UserSignup>>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Some(Form(user)) = payload else {
        return Err(ApiError::Validation(MISSING_FIELDS));
    };

    if user.username.is_empty() || user.password.is_empty() || user.mail.is_empty() {
        return Err(ApiError::Validation(MISSING_FIELDS));
    }

    if !valid_email(&user.mail) {
        return Err(ApiError::Validation(INVALID_EMAIL));
    }

    if store
        .mail_in_use(&user.mail)
        .await
        .map_err(|e| ApiError::persistence(CREATE_FAILED, e))?
    {
        debug!("Mail already in use");
        return Err(ApiError::Conflict(MAIL_IN_USE));
    }

    if store
        .username_in_use(&user.username)
        .await
        .map_err(|e| ApiError::persistence(CREATE_FAILED, e))?
    {
        debug!("Username already in use");
        return Err(ApiError::Conflict(USERNAME_IN_USE));
    }

    let password_hash = hash_password(user.password, auth_config.bcrypt_cost())
        .await
        .map_err(|e| ApiError::internal("Failed to hash password", e))?;

    let new_user = NewUser {
        username: user.username,
        mail: user.mail,
        password_hash,
        location: user.location.filter(|location| !location.is_empty()),
    };

    match store.create_user(new_user).await {
        Ok(CreateOutcome::Created(user_id)) => {
            info!(user_id, "Account created");
            Ok((
                StatusCode::CREATED,
                Json(MessageResponse::new("Account created successfully")),
            ))
        }
        Ok(CreateOutcome::MailTaken) => Err(ApiError::Conflict(MAIL_IN_USE)),
        Ok(CreateOutcome::UsernameTaken) => Err(ApiError::Conflict(USERNAME_IN_USE)),
        Err(e) => Err(ApiError::persistence(CREATE_FAILED, e)),
    }
}
