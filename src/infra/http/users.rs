//! User handlers: profiles, suggestions, follows, and profile updates.

use axum::Json;
use axum::extract::{Extension, State};
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

use perch_api_types::UpdateProfileRequest;

use super::RouterState;
use super::error::{ApiError, ApiJson, ApiPath};
use super::middleware::SessionUser;
use super::models::user_to_api;

pub async fn profile(
    State(state): State<RouterState>,
    ApiPath(username): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.users.profile(&username).await?;
    Ok(Json(user_to_api(view)))
}

pub async fn suggested(
    State(state): State<RouterState>,
    Extension(session): Extension<SessionUser>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state.users.suggested(&session.0).await?;
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        out.push(user_to_api(state.users.with_relations(record).await?));
    }
    Ok(Json(out))
}

pub async fn follow(
    State(state): State<RouterState>,
    Extension(session): Extension<SessionUser>,
    ApiPath(target_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let followed = state.users.follow_unfollow(&session.0, target_id).await?;
    let message = if followed {
        "User followed successfully"
    } else {
        "User unfollowed successfully"
    };
    Ok(Json(json!({ "message": message })))
}

pub async fn update(
    State(state): State<RouterState>,
    Extension(session): Extension<SessionUser>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.users.update_profile(&session.0, req).await?;
    Ok(Json(user_to_api(view)))
}
