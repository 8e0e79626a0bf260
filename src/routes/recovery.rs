use axum::extract::{FromRequest, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::{AppError, StatusMessage};
use crate::recovery;
use crate::state::SharedState;

/// `axum::Json` whose rejections render as the shared error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Deserialize)]
pub struct RecoveryLinkRequest {
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub email: String,
    pub new_password: String,
}

pub async fn send_recovery_link(
    State(state): State<SharedState>,
    AppJson(req): AppJson<RecoveryLinkRequest>,
) -> Result<StatusMessage, AppError> {
    recovery::issue_reset_link(&state, &req.email).await?;

    Ok(StatusMessage::new(
        StatusCode::OK,
        "Recovery link sent successfully.",
    ))
}

pub async fn reset_password(
    State(state): State<SharedState>,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> Result<StatusMessage, AppError> {
    recovery::reset_password(&state, &req.email, &req.token, &req.new_password).await?;

    Ok(StatusMessage::new(StatusCode::OK, "Password reset successfully."))
}
