//! Post feed service.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use perch_api_types::CreatePostRequest;

use crate::application::repos::{
    CreateNotificationParams, CreatePostParams, NotificationsRepo, PostsRepo, RepoError, UsersRepo,
};
use crate::domain::entities::{PostRecord, PostWithLikes, UserRecord};
use crate::domain::types::NotificationKind;

const FEED_LIMIT: i64 = 100;
const MAX_POST_LEN: usize = 500;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("{0}")]
    Validation(String),
    #[error("You are not authorized to delete this post")]
    Forbidden,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct PostService {
    posts: Arc<dyn PostsRepo>,
    users: Arc<dyn UsersRepo>,
    notifications: Arc<dyn NotificationsRepo>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        users: Arc<dyn UsersRepo>,
        notifications: Arc<dyn NotificationsRepo>,
    ) -> Self {
        Self {
            posts,
            users,
            notifications,
        }
    }

    pub async fn create(
        &self,
        actor: &UserRecord,
        req: CreatePostRequest,
    ) -> Result<PostWithLikes, PostError> {
        let text = req.text.trim().to_string();
        if text.is_empty() && req.img.is_none() {
            return Err(PostError::Validation(
                "Post must have text or image".to_string(),
            ));
        }
        if text.len() > MAX_POST_LEN {
            return Err(PostError::Validation("Post text is too long".to_string()));
        }

        let record = self
            .posts
            .insert_post(CreatePostParams {
                id: Uuid::new_v4(),
                user_id: actor.id,
                text,
                img: req.img,
            })
            .await?;
        Ok(PostWithLikes {
            record,
            likes: Vec::new(),
        })
    }

    pub async fn delete(&self, actor: &UserRecord, post_id: Uuid) -> Result<(), PostError> {
        let post = self
            .posts
            .find_post(post_id)
            .await?
            .ok_or(PostError::NotFound)?;
        if post.user_id != actor.id {
            return Err(PostError::Forbidden);
        }
        self.posts.delete_post(post_id).await?;
        Ok(())
    }

    /// Toggle like state. Returns true when the post is now liked; a new
    /// like on someone else's post raises a notification for the author.
    pub async fn like_unlike(&self, actor: &UserRecord, post_id: Uuid) -> Result<bool, PostError> {
        let post = self
            .posts
            .find_post(post_id)
            .await?
            .ok_or(PostError::NotFound)?;

        if self.posts.has_liked(post_id, actor.id).await? {
            self.posts.delete_like(post_id, actor.id).await?;
            return Ok(false);
        }

        self.posts.insert_like(post_id, actor.id).await?;
        if post.user_id != actor.id {
            self.notifications
                .insert_notification(CreateNotificationParams {
                    id: Uuid::new_v4(),
                    from_user: actor.id,
                    to_user: post.user_id,
                    kind: NotificationKind::Like,
                })
                .await?;
        }
        Ok(true)
    }

    pub async fn all(&self) -> Result<Vec<PostWithLikes>, PostError> {
        let records = self.posts.list_all_posts(FEED_LIMIT).await?;
        self.attach_likes(records).await
    }

    pub async fn following(&self, actor: &UserRecord) -> Result<Vec<PostWithLikes>, PostError> {
        let records = self.posts.list_following_posts(actor.id).await?;
        self.attach_likes(records).await
    }

    pub async fn by_username(&self, username: &str) -> Result<Vec<PostWithLikes>, PostError> {
        let user = self
            .users
            .find_user_by_username(username)
            .await?
            .ok_or(PostError::UserNotFound)?;
        let records = self.posts.list_posts_by_user(user.id).await?;
        self.attach_likes(records).await
    }

    pub async fn liked_by(&self, user_id: Uuid) -> Result<Vec<PostWithLikes>, PostError> {
        let records = self.posts.list_posts_liked_by(user_id).await?;
        self.attach_likes(records).await
    }

    async fn attach_likes(
        &self,
        records: Vec<PostRecord>,
    ) -> Result<Vec<PostWithLikes>, PostError> {
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let likes = self.posts.like_user_ids(record.id).await?;
            out.push(PostWithLikes { record, likes });
        }
        Ok(out)
    }
}
