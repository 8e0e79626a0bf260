//! Password reset protocol: issue a single-use token by email, then trade it
//! for a new password.

pub mod password;
pub mod token;

use chrono::{Duration, Utc};

use crate::error::AppError;
use crate::state::AppState;

/// How long an issued reset token stays valid.
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

/// Issue a fresh reset token for `email` and mail the recovery link.
///
/// Any earlier pending token for the same user is overwritten. If mailing
/// fails the new token stays stored; the next issuance replaces it.
pub async fn issue_reset_link(state: &AppState, email: &str) -> Result<(), AppError> {
    let user = state
        .users
        .find_by_email(email)
        .await?
        .ok_or(AppError::NotFound)?;

    let token = token::generate_token();
    let expires_at = Utc::now() + RESET_TOKEN_TTL;

    let stored = state
        .users
        .set_reset_token(user.id, &token::hash_token(&token), expires_at)
        .await?;
    if !stored {
        return Err(AppError::NotFound);
    }

    let link = token::reset_link(&state.config.base_url, &token, &user.email);
    state.notifier.send_password_reset(&user.email, &link).await?;

    tracing::info!(user_id = %user.id, %expires_at, "Recovery link sent");
    Ok(())
}

/// Validate `token` for `email` and replace the password.
///
/// Unknown email, wrong token, expired token and an already used token are
/// indistinguishable to the caller.
pub async fn reset_password(
    state: &AppState,
    email: &str,
    token: &str,
    new_password: &str,
) -> Result<(), AppError> {
    let token_hash = token::hash_token(token);

    let user = state
        .users
        .find_by_reset_token(email, &token_hash, Utc::now())
        .await?
        .ok_or(AppError::InvalidOrExpired)?;

    let pw_hash = password::hash_blocking(new_password.to_string())
        .await
        .map_err(AppError::Internal)?;

    // Re-checked inside the write so two requests racing on one token
    // cannot both succeed.
    let committed = state
        .users
        .complete_reset(user.id, &token_hash, &pw_hash, Utc::now())
        .await?;
    if !committed {
        return Err(AppError::InvalidOrExpired);
    }

    tracing::info!(user_id = %user.id, "Password reset");
    Ok(())
}
