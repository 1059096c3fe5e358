//! Session middleware and request logging.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::entities::UserRecord;

use super::RouterState;
use super::error::ApiError;

pub const SESSION_COOKIE: &str = "perch_session";
const SESSION_COOKIE_DAYS: i64 = 30;

/// The authenticated user, inserted into request extensions by
/// [`session_auth`].
#[derive(Clone)]
pub struct SessionUser(pub Arc<UserRecord>);

pub async fn session_auth(
    State(state): State<RouterState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    else {
        return ApiError::unauthorized().into_response();
    };

    match state.auth.authenticate(token).await {
        Ok(user) => {
            request.extensions_mut().insert(SessionUser(Arc::new(user)));
            next.run(request).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

pub fn session_cookie(token: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(Duration::days(SESSION_COOKIE_DAYS))
        .build()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(Duration::ZERO)
        .build()
}

pub async fn log_responses(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() || status.is_client_error() {
        warn!(target: "perch::http", %method, path, status = status.as_u16(), "request failed");
    } else {
        debug!(target: "perch::http", %method, path, status = status.as_u16(), "request");
    }
    response
}
