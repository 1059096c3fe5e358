//! Domain record → wire type conversions.

use perch_api_types::{Notification, NotificationKind, Post, User};

use crate::domain::entities::{NotificationRecord, PostWithLikes, UserWithRelations};
use crate::domain::types::NotificationKind as DomainKind;

pub fn user_to_api(view: UserWithRelations) -> User {
    let record = view.record;
    User {
        id: record.id,
        username: record.username,
        full_name: record.full_name,
        email: record.email,
        bio: record.bio,
        link: record.link,
        profile_img: record.profile_img,
        cover_img: record.cover_img,
        followers: view.followers,
        following: view.following,
        created_at: record.created_at,
    }
}

pub fn post_to_api(view: PostWithLikes) -> Post {
    let record = view.record;
    Post {
        id: record.id,
        user_id: record.user_id,
        username: record.author_username,
        text: record.text,
        img: record.img,
        likes: view.likes,
        created_at: record.created_at,
    }
}

pub fn notification_to_api(record: NotificationRecord) -> Notification {
    Notification {
        id: record.id,
        from: record.from_user,
        to: record.to_user,
        kind: match record.kind {
            DomainKind::Follow => NotificationKind::Follow,
            DomainKind::Like => NotificationKind::Like,
        },
        read: record.read,
        created_at: record.created_at,
    }
}
