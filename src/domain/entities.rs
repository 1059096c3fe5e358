//! Persistent domain records.

use time::OffsetDateTime;
use uuid::Uuid;

use super::types::NotificationKind;

/// A registered user. Credential fields never leave the server; the public
/// view is assembled in the HTTP layer from this record plus relation lists.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub hashed_password: String,
    pub password_salt: String,
    pub bio: String,
    pub link: String,
    pub profile_img: String,
    pub cover_img: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A user together with its follow relations, as served to clients.
#[derive(Debug, Clone)]
pub struct UserWithRelations {
    pub record: UserRecord,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
}

/// A feed post. `author_username` is denormalized into the read model so
/// feed queries stay single-pass.
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_username: String,
    pub text: String,
    pub img: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct PostWithLikes {
    pub record: PostRecord,
    pub likes: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: OffsetDateTime,
}

/// A login session. The token travels in an http-only cookie.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub token: Uuid,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl SessionRecord {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;

    #[test]
    fn session_expiry_is_inclusive() {
        let now = OffsetDateTime::now_utc();
        let session = SessionRecord {
            token: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            created_at: now - Duration::days(30),
            expires_at: now,
        };
        assert!(session.is_expired(now));
        assert!(!session.is_expired(now - Duration::seconds(1)));
    }
}
