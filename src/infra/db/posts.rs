use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreatePostParams, PostsRepo, RepoError};
use crate::domain::entities::PostRecord;

use super::{PgRepositories, map_sqlx_error};

const POST_SELECT: &str = "SELECT p.id, p.user_id, u.username AS author_username, \
            p.text, p.img, p.created_at \
     FROM posts p INNER JOIN users u ON u.id = p.user_id";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    author_username: String,
    text: String,
    img: Option<String>,
    created_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            author_username: row.author_username,
            text: row.text,
            img: row.img,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PostsRepo for PgRepositories {
    async fn insert_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        sqlx::query("INSERT INTO posts (id, user_id, text, img) VALUES ($1, $2, $3, $4)")
            .bind(params.id)
            .bind(params.user_id)
            .bind(&params.text)
            .bind(params.img.as_deref())
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        self.find_post(params.id)
            .await?
            .ok_or(RepoError::NotFound)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let sql = format!("{POST_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_all_posts(&self, limit: i64) -> Result<Vec<PostRecord>, RepoError> {
        let sql = format!("{POST_SELECT} ORDER BY p.created_at DESC LIMIT $1");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(limit)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_posts_by_user(&self, user_id: Uuid) -> Result<Vec<PostRecord>, RepoError> {
        let sql = format!("{POST_SELECT} WHERE p.user_id = $1 ORDER BY p.created_at DESC");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_following_posts(&self, user_id: Uuid) -> Result<Vec<PostRecord>, RepoError> {
        let sql = format!(
            "{POST_SELECT} \
             INNER JOIN follows f ON f.followed_id = p.user_id \
             WHERE f.follower_id = $1 \
             ORDER BY p.created_at DESC"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_posts_liked_by(&self, user_id: Uuid) -> Result<Vec<PostRecord>, RepoError> {
        let sql = format!(
            "{POST_SELECT} \
             INNER JOIN post_likes pl ON pl.post_id = p.id \
             WHERE pl.user_id = $1 \
             ORDER BY pl.created_at DESC"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(user_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn has_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM post_likes WHERE post_id = $1 AND user_id = $2)",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn like_user_ids(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM post_likes WHERE post_id = $1 ORDER BY created_at",
        )
        .bind(post_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}
