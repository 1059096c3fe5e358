use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreateNotificationParams, NotificationsRepo, RepoError};
use crate::domain::entities::NotificationRecord;
use crate::domain::types::NotificationKind;

use super::{PgRepositories, map_sqlx_error};

const NOTIFICATION_COLUMNS: &str = "id, from_user, to_user, kind, read, created_at";

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    from_user: Uuid,
    to_user: Uuid,
    kind: NotificationKind,
    read: bool,
    created_at: OffsetDateTime,
}

impl From<NotificationRow> for NotificationRecord {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            from_user: row.from_user,
            to_user: row.to_user,
            kind: row.kind,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl NotificationsRepo for PgRepositories {
    async fn insert_notification(
        &self,
        params: CreateNotificationParams,
    ) -> Result<NotificationRecord, RepoError> {
        let sql = format!(
            "INSERT INTO notifications (id, from_user, to_user, kind) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {NOTIFICATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(params.id)
            .bind(params.from_user)
            .bind(params.to_user)
            .bind(params.kind)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn list_notifications(
        &self,
        to_user: Uuid,
    ) -> Result<Vec<NotificationRecord>, RepoError> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE to_user = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(to_user)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn mark_all_read(&self, to_user: Uuid) -> Result<(), RepoError> {
        sqlx::query("UPDATE notifications SET read = true WHERE to_user = $1 AND read = false")
            .bind(to_user)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_all_notifications(&self, to_user: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM notifications WHERE to_user = $1")
            .bind(to_user)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
