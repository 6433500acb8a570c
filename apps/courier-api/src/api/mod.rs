//! API route composition.

pub mod emails;
pub mod health;

use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/ready", get(health::ready_handler))
        .route(
            "/emails",
            post(emails::send_email).get(emails::list_deliveries),
        )
        .route("/emails/{id}", get(emails::get_message_details))
        .with_state(state)
}
