//! Auth handlers: signup, login, logout, me.

use axum::Json;
use axum::extract::{Extension, State};
use axum::response::IntoResponse;
use axum_extra::extract::CookieJar;
use serde_json::json;
use uuid::Uuid;

use perch_api_types::{LoginRequest, SignupRequest};

use super::RouterState;
use super::error::{ApiError, ApiJson};
use super::middleware::{SESSION_COOKIE, SessionUser, expired_session_cookie, session_cookie};
use super::models::user_to_api;

pub async fn signup(
    State(state): State<RouterState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, session) = state.auth.signup(&req).await?;
    let view = state.users.with_relations(user).await?;
    Ok((
        jar.add(session_cookie(session.token)),
        Json(user_to_api(view)),
    ))
}

pub async fn login(
    State(state): State<RouterState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, session) = state.auth.login(&req).await?;
    let view = state.users.with_relations(user).await?;
    Ok((
        jar.add(session_cookie(session.token)),
        Json(user_to_api(view)),
    ))
}

pub async fn logout(
    State(state): State<RouterState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    {
        state.auth.logout(token).await?;
    }
    Ok((
        jar.add(expired_session_cookie()),
        Json(json!({ "message": "Logged out successfully" })),
    ))
}

pub async fn me(
    State(state): State<RouterState>,
    Extension(session): Extension<SessionUser>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.users.with_relations((*session.0).clone()).await?;
    Ok(Json(user_to_api(view)))
}
