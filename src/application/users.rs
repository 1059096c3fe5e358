//! User profile and follow-graph service.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use perch_api_types::UpdateProfileRequest;

use crate::application::auth::{
    hash_password, validate_email, validate_password, validate_username, verify_password,
    generate_salt,
};
use crate::application::repos::{
    CreateNotificationParams, NotificationsRepo, RepoError, UpdateUserParams, UsersRepo,
};
use crate::domain::entities::{UserRecord, UserWithRelations};
use crate::domain::types::NotificationKind;

const SUGGESTED_LIMIT: i64 = 4;
const MAX_FULL_NAME_LEN: usize = 100;
const MAX_BIO_LEN: usize = 300;
const MAX_LINK_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("Username is already taken")]
    UsernameTaken,
    #[error("Email is already taken")]
    EmailTaken,
    #[error("Current password is incorrect")]
    WrongPassword,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct UserService {
    users: Arc<dyn UsersRepo>,
    notifications: Arc<dyn NotificationsRepo>,
}

impl UserService {
    pub fn new(users: Arc<dyn UsersRepo>, notifications: Arc<dyn NotificationsRepo>) -> Self {
        Self {
            users,
            notifications,
        }
    }

    pub async fn profile(&self, username: &str) -> Result<UserWithRelations, UserError> {
        let record = self
            .users
            .find_user_by_username(username)
            .await?
            .ok_or(UserError::NotFound)?;
        self.with_relations(record).await
    }

    pub async fn with_relations(
        &self,
        record: UserRecord,
    ) -> Result<UserWithRelations, UserError> {
        let followers = self.users.follower_ids(record.id).await?;
        let following = self.users.following_ids(record.id).await?;
        Ok(UserWithRelations {
            record,
            followers,
            following,
        })
    }

    /// The `/api/users/update` contract: applies the requested field changes
    /// and returns the updated public profile. Invalid payloads are rejected
    /// with a descriptive error; the full name must be non-blank.
    pub async fn update_profile(
        &self,
        actor: &UserRecord,
        req: UpdateProfileRequest,
    ) -> Result<UserWithRelations, UserError> {
        let full_name = req.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(UserError::Validation("Full name is required".to_string()));
        }
        if full_name.len() > MAX_FULL_NAME_LEN {
            return Err(UserError::Validation(
                "Full name is too long".to_string(),
            ));
        }
        if req.bio.as_ref().is_some_and(|b| b.len() > MAX_BIO_LEN) {
            return Err(UserError::Validation("Bio is too long".to_string()));
        }
        if req.link.as_ref().is_some_and(|l| l.len() > MAX_LINK_LEN) {
            return Err(UserError::Validation("Link is too long".to_string()));
        }

        if let Some(username) = req.username.as_deref()
            && username != actor.username
        {
            validate_username(username).map_err(|err| UserError::Validation(err.to_string()))?;
            if self.users.find_user_by_username(username).await?.is_some() {
                return Err(UserError::UsernameTaken);
            }
        }
        if let Some(email) = req.email.as_deref()
            && email != actor.email
        {
            validate_email(email).map_err(|err| UserError::Validation(err.to_string()))?;
            if self.users.find_user_by_email(email).await?.is_some() {
                return Err(UserError::EmailTaken);
            }
        }

        let credentials = self.password_change(actor, &req)?;
        let (hashed_password, password_salt) = match credentials {
            Some((hash, salt)) => (Some(hash), Some(salt)),
            None => (None, None),
        };

        let updated = self
            .users
            .update_user(UpdateUserParams {
                id: actor.id,
                full_name,
                email: req.email,
                username: req.username,
                bio: req.bio,
                link: req.link,
                profile_img: req.profile_img,
                cover_img: req.cover_img,
                hashed_password,
                password_salt,
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { constraint } if constraint.contains("email") => {
                    UserError::EmailTaken
                }
                RepoError::Duplicate { .. } => UserError::UsernameTaken,
                RepoError::NotFound => UserError::NotFound,
                other => UserError::Repo(other),
            })?;

        info!(username = %updated.username, "profile updated");
        self.with_relations(updated).await
    }

    /// Toggle follow state. Returns true when the actor now follows the
    /// target; a new follow also raises a notification for the target.
    pub async fn follow_unfollow(
        &self,
        actor: &UserRecord,
        target_id: Uuid,
    ) -> Result<bool, UserError> {
        if actor.id == target_id {
            return Err(UserError::Validation(
                "You can't follow/unfollow yourself".to_string(),
            ));
        }
        let target = self
            .users
            .find_user_by_id(target_id)
            .await?
            .ok_or(UserError::NotFound)?;

        if self.users.is_following(actor.id, target.id).await? {
            self.users.delete_follow(actor.id, target.id).await?;
            Ok(false)
        } else {
            self.users.insert_follow(actor.id, target.id).await?;
            self.notifications
                .insert_notification(CreateNotificationParams {
                    id: Uuid::new_v4(),
                    from_user: actor.id,
                    to_user: target.id,
                    kind: NotificationKind::Follow,
                })
                .await?;
            Ok(true)
        }
    }

    pub async fn suggested(&self, actor: &UserRecord) -> Result<Vec<UserRecord>, UserError> {
        self.users
            .suggested_users(actor.id, SUGGESTED_LIMIT)
            .await
            .map_err(UserError::from)
    }

    fn password_change(
        &self,
        actor: &UserRecord,
        req: &UpdateProfileRequest,
    ) -> Result<Option<(String, String)>, UserError> {
        match (req.current_password.as_deref(), req.new_password.as_deref()) {
            (None, None) => Ok(None),
            (Some(current), Some(new)) => {
                if !verify_password(current, &actor.password_salt, &actor.hashed_password) {
                    return Err(UserError::WrongPassword);
                }
                validate_password(new).map_err(|err| UserError::Validation(err.to_string()))?;
                let salt = generate_salt();
                let hash = hash_password(new, &salt);
                Ok(Some((hash, salt)))
            }
            _ => Err(UserError::Validation(
                "Please provide both current password and new password".to_string(),
            )),
        }
    }
}
