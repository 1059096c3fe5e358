//! Session-side of the data layer: who is logged in.

use std::sync::Arc;

use perch_api_types::{LoginRequest, SignupRequest, User};

use crate::cache::{QueryCache, QueryKey};
use crate::http::{ApiClient, ClientError, paths, server_message};

/// Fetches and caches the `authUser` entry and drives the session routes.
pub struct AuthSession {
    api: ApiClient,
    cache: Arc<QueryCache>,
}

impl AuthSession {
    pub fn new(api: ApiClient, cache: Arc<QueryCache>) -> Self {
        Self { api, cache }
    }

    /// The current session's user, fetched once per app load and then served
    /// from the cache until `authUser` is invalidated. `None` means not
    /// logged in; that outcome is cached too.
    pub async fn auth_user(&self) -> Result<Option<User>, ClientError> {
        let api = self.api.clone();
        self.cache
            .get_or_fetch(QueryKey::AuthUser, move || async move {
                fetch_me(&api).await
            })
            .await
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<User, ClientError> {
        let user: User = self.api.post(paths::AUTH_SIGNUP, req).await?;
        self.cache.store(QueryKey::AuthUser, &Some(user.clone()));
        Ok(user)
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<User, ClientError> {
        let user: User = self.api.post(paths::AUTH_LOGIN, req).await?;
        self.cache.store(QueryKey::AuthUser, &Some(user.clone()));
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let resp = self.api.send_json(paths::AUTH_LOGOUT, &()).await?;
        if !resp.status().is_success() {
            let value: serde_json::Value = resp
                .json()
                .await
                .map_err(|_| ClientError::InvalidResponse)?;
            return Err(ClientError::Server(server_message(&value)));
        }
        self.cache.invalidate(QueryKey::AuthUser).await;
        Ok(())
    }
}

async fn fetch_me(api: &ApiClient) -> Result<Option<User>, ClientError> {
    let resp = api.send_get(paths::AUTH_ME).await?;
    let status = resp.status();
    let bytes = resp.bytes().await?;
    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|_| ClientError::InvalidResponse)?;
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(ClientError::Server(server_message(&value)));
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|_| ClientError::InvalidResponse)
}
