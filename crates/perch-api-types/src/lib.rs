//! Shared request and response types for the Perch social feed API.
//!
//! Wire names use camelCase to match the JSON the frontend consumes. The
//! server and the client data layer both depend on this crate so the two
//! sides cannot drift apart.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Default message for failures the server does not explain further.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

/// Message returned for requests that match no route.
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Route not found";

/// Error body returned by every failing API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Public view of a user. Never carries credential fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub profile_img: String,
    #[serde(default)]
    pub cover_img: String,
    #[serde(default)]
    pub followers: Vec<Uuid>,
    #[serde(default)]
    pub following: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A post in a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(default)]
    pub likes: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Follow,
    Like,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub from: Uuid,
    pub to: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /api/users/update`. Every field is optional except the full
/// name, which must be present and non-blank after trimming; the client
/// checks this before sending and the server enforces it again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_img: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_img: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_uses_camel_case_wire_names() {
        let body = UpdateProfileRequest {
            full_name: "Robin Wren".to_string(),
            profile_img: Some("https://img.example/r.png".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["fullName"], "Robin Wren");
        assert_eq!(json["profileImg"], "https://img.example/r.png");
        assert!(json.get("bio").is_none());
    }

    #[test]
    fn notification_kind_serializes_as_type_field() {
        let n = Notification {
            id: Uuid::new_v4(),
            from: Uuid::new_v4(),
            to: Uuid::new_v4(),
            kind: NotificationKind::Follow,
            read: false,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "follow");
    }

    #[test]
    fn user_deserializes_without_optional_collections() {
        let raw = serde_json::json!({
            "id": Uuid::new_v4(),
            "username": "wren",
            "fullName": "Robin Wren",
            "email": "wren@example.com",
            "createdAt": "2026-01-12T08:30:00Z",
        });
        let user: User = serde_json::from_value(raw).unwrap();
        assert!(user.followers.is_empty());
        assert_eq!(user.full_name, "Robin Wren");
    }
}
