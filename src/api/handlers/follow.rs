use crate::{
    api::{
        auth::AuthUser,
        error::{ApiError, ErrorResponse},
        handlers::MessageResponse,
    },
    store::{DynStore, FollowOutcome, UserId},
};
use axum::{
    extract::{Extension, Path},
    Json,
};
use tracing::{debug, info, instrument};

const INVALID_USER_ID: &str = "Invalid user ID";
const USER_NOT_FOUND: &str = "User not found";
const FOLLOW_FAILED: &str = "Failed to follow user";

/// Path ids are plain decimal digits; signs and whitespace are rejected.
fn parse_user_id(raw: &str) -> Option<UserId> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[utoipa::path(
    post,
    path= "/api/follow/{userid}",
    params(
        ("userid" = i64, Path, description = "Id of the user to follow")
    ),
    responses (
        (status = 200, description = "Followed (or already following)", body = MessageResponse),
        (status = 400, description = "Malformed user id or self-follow", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 404, description = "Target user does not exist", body = ErrorResponse),
        (status = 500, description = "Persistence failure", body = ErrorResponse),
    ),
    tag= "follow"
)]
#[instrument(skip(store))]
pub async fn follow(
    store: Extension<DynStore>,
    user: AuthUser,
    Path(userid): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let followed = parse_user_id(&userid).ok_or(ApiError::Validation(INVALID_USER_ID))?;

    if followed == user.user_id {
        return Err(ApiError::Validation("Cannot follow yourself"));
    }

    if !store
        .user_exists(followed)
        .await
        .map_err(|e| ApiError::persistence(FOLLOW_FAILED, e))?
    {
        return Err(ApiError::NotFound(USER_NOT_FOUND));
    }

    match store.follow(user.user_id, followed).await {
        Ok(FollowOutcome::Created) => {
            info!(follower = user.user_id, followed, "Follow created");
        }
        Ok(FollowOutcome::AlreadyFollowing) => {
            debug!(follower = user.user_id, followed, "Already following");
        }
        Ok(FollowOutcome::UnknownUser) => return Err(ApiError::NotFound(USER_NOT_FOUND)),
        Err(e) => return Err(ApiError::persistence(FOLLOW_FAILED, e)),
    }

    Ok(Json(MessageResponse::new("Followed user successfully")))
}
