pub mod recovery;

use axum::Router;
use axum::routing::post;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/Website/send_forgot_password_recovery_link",
            post(recovery::send_recovery_link),
        )
        .route("/Website/reset_password", post(recovery::reset_password))
}
