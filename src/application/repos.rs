//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{NotificationRecord, PostRecord, SessionRecord, UserRecord};
use crate::domain::types::NotificationKind;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub hashed_password: String,
    pub password_salt: String,
}

/// Profile mutation. `None` keeps the stored value; the full name is always
/// written because the service layer guarantees it is present and non-blank.
#[derive(Debug, Clone)]
pub struct UpdateUserParams {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub link: Option<String>,
    pub profile_img: Option<String>,
    pub cover_img: Option<String>,
    pub hashed_password: Option<String>,
    pub password_salt: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub img: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateNotificationParams {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub kind: NotificationKind,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;
    async fn find_user_by_username(&self, username: &str)
    -> Result<Option<UserRecord>, RepoError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;
    async fn update_user(&self, params: UpdateUserParams) -> Result<UserRecord, RepoError>;
    async fn follower_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError>;
    async fn following_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError>;
    async fn is_following(&self, follower: Uuid, followed: Uuid) -> Result<bool, RepoError>;
    async fn insert_follow(&self, follower: Uuid, followed: Uuid) -> Result<(), RepoError>;
    async fn delete_follow(&self, follower: Uuid, followed: Uuid) -> Result<(), RepoError>;
    /// Users the given user does not follow yet, for the "who to follow" box.
    async fn suggested_users(&self, user_id: Uuid, limit: i64)
    -> Result<Vec<UserRecord>, RepoError>;
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn insert_session(&self, session: SessionRecord) -> Result<(), RepoError>;
    async fn find_session(&self, token: Uuid) -> Result<Option<SessionRecord>, RepoError>;
    async fn delete_session(&self, token: Uuid) -> Result<(), RepoError>;
    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn insert_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;
    async fn find_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;
    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError>;
    async fn list_all_posts(&self, limit: i64) -> Result<Vec<PostRecord>, RepoError>;
    async fn list_posts_by_user(&self, user_id: Uuid) -> Result<Vec<PostRecord>, RepoError>;
    async fn list_following_posts(&self, user_id: Uuid) -> Result<Vec<PostRecord>, RepoError>;
    async fn list_posts_liked_by(&self, user_id: Uuid) -> Result<Vec<PostRecord>, RepoError>;
    /// Returns true when the like was newly inserted.
    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;
    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError>;
    async fn has_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;
    async fn like_user_ids(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError>;
}

#[async_trait]
pub trait NotificationsRepo: Send + Sync {
    async fn insert_notification(
        &self,
        params: CreateNotificationParams,
    ) -> Result<NotificationRecord, RepoError>;
    async fn list_notifications(&self, to_user: Uuid)
    -> Result<Vec<NotificationRecord>, RepoError>;
    async fn mark_all_read(&self, to_user: Uuid) -> Result<(), RepoError>;
    async fn delete_all_notifications(&self, to_user: Uuid) -> Result<(), RepoError>;
}
