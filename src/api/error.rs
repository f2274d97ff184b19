//! Error type shared by the HTTP handlers.
//!
//! Client-facing variants carry the exact message returned in the
//! `{"error": ...}` body. Server-side variants carry a detail that is logged
//! and never sent, so the client only sees the public message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("{0}")]
    Authentication(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Configuration(&'static str),

    #[error("{message}: {detail:#}")]
    Internal {
        message: &'static str,
        detail: anyhow::Error,
    },

    #[error("{message}: {detail:#}")]
    Persistence {
        message: &'static str,
        detail: anyhow::Error,
    },
}

impl ApiError {
    pub fn internal(message: &'static str, detail: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message,
            detail: detail.into(),
        }
    }

    pub fn persistence(message: &'static str, detail: impl Into<anyhow::Error>) -> Self {
        Self::Persistence {
            message,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) | Self::Internal { .. } | Self::Persistence { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the caller.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Validation(message)
            | Self::Authentication(message)
            | Self::Conflict(message)
            | Self::NotFound(message)
            | Self::Configuration(message)
            | Self::Internal { message, .. }
            | Self::Persistence { message, .. } => *message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal { .. } | Self::Persistence { .. } | Self::Configuration(_) => {
                error!("{self}");
            }
            _ => {}
        }

        let body = ErrorResponse {
            error: self.public_message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
