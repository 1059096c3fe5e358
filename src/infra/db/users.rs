use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{CreateUserParams, RepoError, UpdateUserParams, UsersRepo};
use crate::domain::entities::UserRecord;

use super::{PgRepositories, map_sqlx_error};

const USER_COLUMNS: &str = "id, username, full_name, email, hashed_password, password_salt, \
     bio, link, profile_img, cover_img, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    full_name: String,
    email: String,
    hashed_password: String,
    password_salt: String,
    bio: String,
    link: String,
    profile_img: String,
    cover_img: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            full_name: row.full_name,
            email: row.email,
            hashed_password: row.hashed_password,
            password_salt: row.password_salt,
            bio: row.bio,
            link: row.link,
            profile_img: row.profile_img,
            cover_img: row.cover_img,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UsersRepo for PgRepositories {
    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let sql = format!(
            "INSERT INTO users (id, username, full_name, email, hashed_password, password_salt) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(params.id)
            .bind(&params.username)
            .bind(&params.full_name)
            .bind(&params.email)
            .bind(&params.hashed_password)
            .bind(&params.password_salt)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.into())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn update_user(&self, params: UpdateUserParams) -> Result<UserRecord, RepoError> {
        // NULL binds keep the stored value via COALESCE; full_name is always
        // written because the service guarantees it is present.
        let sql = format!(
            "UPDATE users SET \
                full_name = $2, \
                email = COALESCE($3, email), \
                username = COALESCE($4, username), \
                bio = COALESCE($5, bio), \
                link = COALESCE($6, link), \
                profile_img = COALESCE($7, profile_img), \
                cover_img = COALESCE($8, cover_img), \
                hashed_password = COALESCE($9, hashed_password), \
                password_salt = COALESCE($10, password_salt), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(params.id)
            .bind(&params.full_name)
            .bind(params.email.as_deref())
            .bind(params.username.as_deref())
            .bind(params.bio.as_deref())
            .bind(params.link.as_deref())
            .bind(params.profile_img.as_deref())
            .bind(params.cover_img.as_deref())
            .bind(params.hashed_password.as_deref())
            .bind(params.password_salt.as_deref())
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;
        Ok(row.into())
    }

    async fn follower_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT follower_id FROM follows WHERE followed_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn following_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT followed_id FROM follows WHERE follower_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn is_following(&self, follower: Uuid, followed: Uuid) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(follower)
        .bind(followed)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert_follow(&self, follower: Uuid, followed: Uuid) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO follows (follower_id, followed_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(follower)
        .bind(followed)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_follow(&self, follower: Uuid, followed: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
            .bind(follower)
            .bind(followed)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn suggested_users(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<UserRecord>, RepoError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u \
             WHERE u.id <> $1 \
               AND NOT EXISTS (SELECT 1 FROM follows f \
                               WHERE f.follower_id = $1 AND f.followed_id = u.id) \
             ORDER BY random() \
             LIMIT $2"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
