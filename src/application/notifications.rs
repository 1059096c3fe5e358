//! Notification inbox service.

use std::sync::Arc;

use thiserror::Error;

use crate::application::repos::{NotificationsRepo, RepoError};
use crate::domain::entities::{NotificationRecord, UserRecord};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct NotificationService {
    notifications: Arc<dyn NotificationsRepo>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationsRepo>) -> Self {
        Self { notifications }
    }

    /// List the inbox. Reading marks everything as read, so the unread
    /// badge clears after one fetch.
    pub async fn list(
        &self,
        actor: &UserRecord,
    ) -> Result<Vec<NotificationRecord>, NotificationError> {
        let items = self.notifications.list_notifications(actor.id).await?;
        self.notifications.mark_all_read(actor.id).await?;
        Ok(items)
    }

    pub async fn clear(&self, actor: &UserRecord) -> Result<(), NotificationError> {
        self.notifications.delete_all_notifications(actor.id).await?;
        Ok(())
    }
}
