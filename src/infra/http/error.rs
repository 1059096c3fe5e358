//! HTTP error responses.
//!
//! Every failure serializes to the shared wire body `{"error": "..."}`.
//! Expected failures carry their message through; unexpected ones collapse
//! to the generic message at this boundary so internals never leak.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use perch_api_types::{ErrorBody, GENERIC_ERROR_MESSAGE, ROUTE_NOT_FOUND_MESSAGE};

use crate::application::auth::AuthError;
use crate::application::notifications::NotificationError;
use crate::application::posts::PostError;
use crate::application::repos::RepoError;
use crate::application::users::UserError;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn route_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, ROUTE_NOT_FOUND_MESSAGE)
    }

    /// Log the detail server-side, answer with the generic message.
    pub fn internal(source: &'static str, detail: impl std::fmt::Display) -> Self {
        error!(target: "perch::http", source, detail = %detail, "unhandled error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::not_found("Resource not found"),
            RepoError::InvalidInput { message } => Self::bad_request(message),
            RepoError::Duplicate { .. } => Self::bad_request("Duplicate record"),
            other @ (RepoError::Persistence(_) | RepoError::Timeout) => {
                Self::internal("infra::http::repo", other)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => Self::unauthorized(),
            AuthError::Repo(repo) => repo.into(),
            other => Self::bad_request(other.to_string()),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => Self::not_found(err.to_string()),
            UserError::Repo(repo) => repo.into(),
            other => Self::bad_request(other.to_string()),
        }
    }
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound | PostError::UserNotFound => Self::not_found(err.to_string()),
            PostError::Forbidden => Self::forbidden(err.to_string()),
            PostError::Repo(repo) => repo.into(),
            other => Self::bad_request(other.to_string()),
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Repo(repo) => repo.into(),
        }
    }
}

/// JSON extractor whose rejection answers in the shared error body instead
/// of axum's plain-text default.
#[derive(axum::extract::FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor with the same rejection treatment, so an unparseable path
/// parameter answers in the shared error body too.
#[derive(axum::extract::FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
