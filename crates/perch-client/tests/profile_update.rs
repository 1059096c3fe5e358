//! End-to-end tests for the profile update mutation flow against a mock
//! server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use httpmock::prelude::*;
use perch_api_types::{GENERIC_ERROR_MESSAGE, UpdateProfileRequest};
use perch_client::{ApiClient, ClientError, Notifier, ProfileUpdater, QueryCache, QueryKey};
use serde_json::json;
use uuid::Uuid;

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<(bool, String)>>,
}

impl RecordingNotifier {
    fn successes(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(ok, _)| *ok)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn failures(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(ok, _)| !*ok)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.messages.lock().unwrap().push((true, message.into()));
    }

    fn failure(&self, message: &str) {
        self.messages.lock().unwrap().push((false, message.into()));
    }
}

struct Fixture {
    updater: ProfileUpdater,
    cache: Arc<QueryCache>,
    notifier: Arc<RecordingNotifier>,
}

fn fixture(server: &MockServer) -> Fixture {
    let cache = Arc::new(QueryCache::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let api = ApiClient::new(&server.base_url()).unwrap();
    let updater = ProfileUpdater::new(api, cache.clone(), notifier.clone());
    Fixture {
        updater,
        cache,
        notifier,
    }
}

fn form(full_name: &str) -> UpdateProfileRequest {
    UpdateProfileRequest {
        full_name: full_name.to_string(),
        bio: Some("birdwatcher".to_string()),
        ..Default::default()
    }
}

fn user_body(full_name: &str) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "username": "wren",
        "fullName": full_name,
        "email": "wren@example.com",
        "bio": "birdwatcher",
        "link": "",
        "profileImg": "",
        "coverImg": "",
        "followers": [],
        "following": [],
        "createdAt": "2026-01-12T08:30:00Z",
    })
}

#[tokio::test]
async fn blank_full_name_fails_without_network_call() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/users/update");
            then.status(200).json_body(user_body("x"));
        })
        .await;
    let fx = fixture(&server);

    let err = fx.updater.update_profile(&form("   ")).await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(mock.calls_async().await, 0);
    assert_eq!(fx.notifier.failures(), vec!["Full name is required"]);
    assert!(!fx.updater.is_updating());
}

#[tokio::test]
async fn successful_update_invalidates_both_cache_entries() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/users/update")
                .header("content-type", "application/json")
                .json_body_includes(r#"{"fullName": "Robin Wren"}"#);
            then.status(200).json_body(user_body("Robin Wren"));
        })
        .await;
    let fx = fixture(&server);
    fx.cache.store(QueryKey::AuthUser, &json!({"stale": false}));
    fx.cache
        .store(QueryKey::UserProfile, &json!({"stale": false}));

    let user = fx.updater.update_profile(&form("Robin Wren")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(user.full_name, "Robin Wren");
    assert!(fx.cache.is_stale(QueryKey::AuthUser));
    assert!(fx.cache.is_stale(QueryKey::UserProfile));
    assert_eq!(fx.notifier.successes(), vec!["Profile updated successfully"]);
    assert!(!fx.updater.is_updating());
}

#[tokio::test]
async fn server_error_message_is_passed_through() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/users/update");
            then.status(400).json_body(json!({ "error": "Username is taken" }));
        })
        .await;
    let fx = fixture(&server);
    fx.cache.store(QueryKey::AuthUser, &json!({"fresh": true}));

    let err = fx
        .updater
        .update_profile(&form("Robin Wren"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Username is taken");
    assert!(matches!(err, ClientError::Server(_)));
    // Failure must not invalidate anything.
    assert!(!fx.cache.is_stale(QueryKey::AuthUser));
    assert_eq!(fx.notifier.failures(), vec!["Username is taken"]);
}

#[tokio::test]
async fn missing_error_field_falls_back_to_generic_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/users/update");
            then.status(500).json_body(json!({ "detail": "boom" }));
        })
        .await;
    let fx = fixture(&server);

    let err = fx
        .updater
        .update_profile(&form("Robin Wren"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn unparseable_body_is_a_distinct_invalid_response_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/users/update");
            then.status(200).body("<html>proxy error</html>");
        })
        .await;
    let fx = fixture(&server);

    let err = fx
        .updater
        .update_profile(&form("Robin Wren"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidResponse));
    assert_ne!(err.to_string(), GENERIC_ERROR_MESSAGE);
    assert_eq!(fx.notifier.failures(), vec!["invalid response from server"]);
}

#[tokio::test]
async fn in_flight_flag_tracks_the_request() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/users/update");
            then.status(200)
                .json_body(user_body("Robin Wren"))
                .delay(Duration::from_millis(200));
        })
        .await;
    let fx = fixture(&server);
    let updater = Arc::new(fx.updater);

    assert!(!updater.is_updating());
    let task = {
        let updater = updater.clone();
        tokio::spawn(async move { updater.update_profile(&form("Robin Wren")).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(updater.is_updating());

    task.await.unwrap().unwrap();
    assert!(!updater.is_updating());
}
