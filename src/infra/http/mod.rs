//! HTTP surface: router assembly, session middleware, and handlers.
//!
//! Routes are grouped under `/api/{auth,users,posts,notifications}`. In
//! production the fallback serves the embedded frontend bundle, with unknown
//! `/api/*` paths still answered as JSON 404s; in development the fallback is
//! always a JSON 404.

mod auth;
pub mod error;
mod middleware;
mod models;
mod notifications;
mod posts;
mod users;

pub use error::ApiError;
pub use middleware::{SESSION_COOKIE, SessionUser, expired_session_cookie, session_cookie};

use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Router, http::Uri, middleware as axum_middleware};

use crate::application::auth::AuthService;
use crate::application::notifications::NotificationService;
use crate::application::posts::PostService;
use crate::application::users::UserService;
use crate::domain::types::DeploymentMode;
use crate::infra::assets;

#[derive(Clone)]
pub struct RouterState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub notifications: Arc<NotificationService>,
    pub mode: DeploymentMode,
}

pub fn build_router(state: RouterState) -> Router {
    let session_layer =
        axum_middleware::from_fn_with_state(state.clone(), middleware::session_auth);

    let auth_routes = Router::new()
        .route("/me", get(auth::me))
        .route_layer(session_layer.clone())
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    let user_routes = Router::new()
        .route("/profile/{username}", get(users::profile))
        .route("/suggested", get(users::suggested))
        .route("/follow/{id}", post(users::follow))
        .route("/update", post(users::update))
        .route_layer(session_layer.clone());

    let post_routes = Router::new()
        .route("/all", get(posts::all))
        .route("/following", get(posts::following))
        .route("/likes/{id}", get(posts::liked_by))
        .route("/user/{username}", get(posts::by_user))
        .route("/create", post(posts::create))
        .route("/like/{id}", post(posts::like))
        .route("/{id}", delete(posts::delete))
        .route_layer(session_layer.clone());

    let notification_routes = Router::new()
        .route("/", get(notifications::list).delete(notifications::clear))
        .route_layer(session_layer);

    let router = Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/posts", post_routes)
        .nest("/api/notifications", notification_routes);

    let router = if state.mode.is_production() {
        router.fallback(spa_fallback)
    } else {
        router
            .route("/", get(api_running))
            .fallback(route_not_found)
    };

    router
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .with_state(state)
}

async fn api_running() -> &'static str {
    "API is running..."
}

async fn route_not_found() -> Response {
    ApiError::route_not_found().into_response()
}

/// Production fallback: unknown API paths are JSON 404s, everything else is
/// resolved against the embedded frontend bundle (with `index.html` standing
/// in for client-side routes).
async fn spa_fallback(uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        return ApiError::route_not_found().into_response();
    }
    assets::serve(uri.path())
}
