//! Email send, lookup, and delivery-log handlers.

use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mailer::{DeliveryEntry, MailerError, MessageDetails, SendEmailRequest, SendResult};
use serde::Deserialize;
use serde_json::json;

/// Wrapper mapping mailer failures onto HTTP statuses.
pub struct ApiError(MailerError);

impl From<MailerError> for ApiError {
    fn from(err: MailerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MailerError::InvalidRequest(_) | MailerError::Decode(_) => StatusCode::BAD_REQUEST,
            MailerError::Unsupported { .. } => StatusCode::NOT_IMPLEMENTED,
            MailerError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            MailerError::TokenExchange { .. }
            | MailerError::Transport { .. }
            | MailerError::EmptyResponse
            | MailerError::InvalidResponse { .. } => StatusCode::BAD_GATEWAY,
            MailerError::KeyFormat(_)
            | MailerError::Signing(_)
            | MailerError::Config(_)
            | MailerError::Store(_)
            | MailerError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// POST /emails
pub async fn send_email(
    State(state): State<AppState>,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<SendResult>, ApiError> {
    let result = state.service.send_email(&request).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// GET /emails?limit=N
pub async fn list_deliveries(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DeliveryEntry>>, ApiError> {
    let entries = state.service.recent_deliveries(query.limit).await?;
    Ok(Json(entries))
}

/// GET /emails/{id}
pub async fn get_message_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageDetails>, ApiError> {
    let details = state.service.get_message_details(&id).await?;
    Ok(Json(details))
}
