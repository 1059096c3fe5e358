//! Notification handlers.

use axum::Json;
use axum::extract::{Extension, State};
use axum::response::IntoResponse;
use serde_json::json;

use super::RouterState;
use super::error::ApiError;
use super::middleware::SessionUser;
use super::models::notification_to_api;

pub async fn list(
    State(state): State<RouterState>,
    Extension(session): Extension<SessionUser>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state.notifications.list(&session.0).await?;
    Ok(Json(
        items
            .into_iter()
            .map(notification_to_api)
            .collect::<Vec<_>>(),
    ))
}

pub async fn clear(
    State(state): State<RouterState>,
    Extension(session): Extension<SessionUser>,
) -> Result<impl IntoResponse, ApiError> {
    state.notifications.clear(&session.0).await?;
    Ok(Json(json!({ "message": "Notifications deleted successfully" })))
}
