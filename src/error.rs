use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::db::StoreError;
use crate::email::NotifyError;

pub const MSG_NOT_FOUND: &str = "User not found.";
pub const MSG_INVALID_OR_EXPIRED: &str = "Invalid or expired token.";
pub const MSG_INTERNAL: &str = "Internal server error.";
pub const MSG_UNCAUGHT: &str = "Something went wrong!";

/// Response body shared by every route: `{ "status": 200, "msg": "..." }`.
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: u16,
    pub msg: String,
}

impl StatusMessage {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            msg: msg.into(),
        }
    }
}

impl IntoResponse for StatusMessage {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self)).into_response()
    }
}

#[derive(Debug)]
pub enum AppError {
    NotFound,
    /// Wrong email, wrong token and expired token all collapse here.
    InvalidOrExpired,
    Internal(String),
    Store(StoreError),
    /// Request never reached a handler body (unreadable or malformed JSON).
    Malformed(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound => write!(f, "Not Found: {MSG_NOT_FOUND}"),
            AppError::InvalidOrExpired => write!(f, "Bad Request: {MSG_INVALID_OR_EXPIRED}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Store(err) => write!(f, "Store Error: {err}"),
            AppError::Malformed(msg) => write!(f, "Malformed Request: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self {
            AppError::NotFound => StatusMessage::new(StatusCode::NOT_FOUND, MSG_NOT_FOUND),
            AppError::InvalidOrExpired => {
                StatusMessage::new(StatusCode::BAD_REQUEST, MSG_INVALID_OR_EXPIRED)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                StatusMessage::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
            }
            AppError::Store(err) => {
                tracing::error!("Store error: {err}");
                StatusMessage::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
            }
            AppError::Malformed(msg) => {
                tracing::warn!("Rejected request: {msg}");
                StatusMessage::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_UNCAUGHT)
            }
        };
        body.into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        AppError::Internal(format!("Failed to send recovery link: {err}"))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Malformed(rejection.body_text())
    }
}
