//! Tests for the `authUser` read path through the cache.

use std::sync::Arc;

use httpmock::prelude::*;
use perch_client::{ApiClient, AuthSession, QueryCache, QueryKey};
use serde_json::json;
use uuid::Uuid;

fn me_body() -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "username": "wren",
        "fullName": "Robin Wren",
        "email": "wren@example.com",
        "createdAt": "2026-01-12T08:30:00Z",
    })
}

#[tokio::test]
async fn auth_user_is_fetched_once_then_served_from_cache() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/auth/me");
            then.status(200).json_body(me_body());
        })
        .await;

    let cache = Arc::new(QueryCache::new());
    let session = AuthSession::new(ApiClient::new(&server.base_url()).unwrap(), cache.clone());

    let first = session.auth_user().await.unwrap().unwrap();
    let second = session.auth_user().await.unwrap().unwrap();

    assert_eq!(first.username, "wren");
    assert_eq!(second.username, "wren");
    assert_eq!(mock.calls_async().await, 1);
}

#[tokio::test]
async fn unauthorized_session_resolves_to_none() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/auth/me");
            then.status(401).json_body(json!({ "error": "Unauthorized" }));
        })
        .await;

    let cache = Arc::new(QueryCache::new());
    let session = AuthSession::new(ApiClient::new(&server.base_url()).unwrap(), cache);

    assert!(session.auth_user().await.unwrap().is_none());
}

#[tokio::test]
async fn invalidation_triggers_a_fresh_fetch_on_next_read() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/auth/me");
            then.status(200).json_body(me_body());
        })
        .await;

    let cache = Arc::new(QueryCache::new());
    let session = AuthSession::new(ApiClient::new(&server.base_url()).unwrap(), cache.clone());

    session.auth_user().await.unwrap();
    cache.invalidate(QueryKey::AuthUser).await;
    session.auth_user().await.unwrap();

    assert_eq!(mock.calls_async().await, 2);
}
