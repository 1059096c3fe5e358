//! Post handlers: feeds, creation, likes, deletion.

use axum::Json;
use axum::extract::{Extension, State};
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

use perch_api_types::CreatePostRequest;

use super::RouterState;
use super::error::{ApiError, ApiJson, ApiPath};
use super::middleware::SessionUser;
use super::models::post_to_api;

pub async fn all(State(state): State<RouterState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.all().await?;
    Ok(Json(posts.into_iter().map(post_to_api).collect::<Vec<_>>()))
}

pub async fn following(
    State(state): State<RouterState>,
    Extension(session): Extension<SessionUser>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.following(&session.0).await?;
    Ok(Json(posts.into_iter().map(post_to_api).collect::<Vec<_>>()))
}

pub async fn by_user(
    State(state): State<RouterState>,
    ApiPath(username): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.by_username(&username).await?;
    Ok(Json(posts.into_iter().map(post_to_api).collect::<Vec<_>>()))
}

pub async fn liked_by(
    State(state): State<RouterState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.posts.liked_by(user_id).await?;
    Ok(Json(posts.into_iter().map(post_to_api).collect::<Vec<_>>()))
}

pub async fn create(
    State(state): State<RouterState>,
    Extension(session): Extension<SessionUser>,
    ApiJson(req): ApiJson<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.posts.create(&session.0, req).await?;
    Ok(Json(post_to_api(post)))
}

pub async fn like(
    State(state): State<RouterState>,
    Extension(session): Extension<SessionUser>,
    ApiPath(post_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let liked = state.posts.like_unlike(&session.0, post_id).await?;
    let message = if liked {
        "Post liked successfully"
    } else {
        "Post unliked successfully"
    };
    Ok(Json(json!({ "message": message })))
}

pub async fn delete(
    State(state): State<RouterState>,
    Extension(session): Extension<SessionUser>,
    ApiPath(post_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.posts.delete(&session.0, post_id).await?;
    Ok(Json(json!({ "message": "Post deleted successfully" })))
}
