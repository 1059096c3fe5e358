//! Profile update mutation flow.
//!
//! Validates locally, issues the update request, and on success marks the
//! `authUser` and `userProfile` cache entries stale before surfacing the
//! success notification, so any subsequent render refetches the new data.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use perch_api_types::{UpdateProfileRequest, User};
use tracing::debug;

use crate::cache::{QueryCache, QueryKey};
use crate::http::{ApiClient, ClientError, paths, server_message};
use crate::notify::Notifier;

const FULL_NAME_REQUIRED: &str = "Full name is required";
const SUCCESS_MESSAGE: &str = "Profile updated successfully";

/// Client-side handle for `POST /api/users/update`.
pub struct ProfileUpdater {
    api: ApiClient,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
    in_flight: AtomicBool,
}

impl ProfileUpdater {
    pub fn new(api: ApiClient, cache: Arc<QueryCache>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            cache,
            notifier,
            in_flight: AtomicBool::new(false),
        }
    }

    /// True from request issuance until the mutation settles either way.
    /// UIs use this to disable the submit control.
    pub fn is_updating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Send the profile update.
    ///
    /// A blank full name fails locally before any network call. On success
    /// both dependent cache entries are invalidated concurrently and awaited
    /// before the success notification fires; on failure the error message is
    /// surfaced and no cache entry is touched.
    pub async fn update_profile(&self, form: &UpdateProfileRequest) -> Result<User, ClientError> {
        if form.full_name.trim().is_empty() {
            let err = ClientError::Validation(FULL_NAME_REQUIRED.to_string());
            self.notifier.failure(FULL_NAME_REQUIRED);
            return Err(err);
        }

        self.in_flight.store(true, Ordering::SeqCst);
        let result = self.send(form).await;
        match &result {
            Ok(user) => {
                debug!(username = %user.username, "profile updated");
                tokio::join!(
                    self.cache.invalidate(QueryKey::AuthUser),
                    self.cache.invalidate(QueryKey::UserProfile),
                );
                self.notifier.success(SUCCESS_MESSAGE);
            }
            Err(err) => {
                self.notifier.failure(&err.to_string());
            }
        }
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn send(&self, form: &UpdateProfileRequest) -> Result<User, ClientError> {
        let resp = self.api.send_json(paths::USERS_UPDATE, form).await?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(ClientError::Http)?;
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|_| ClientError::InvalidResponse)?;
        if !status.is_success() {
            return Err(ClientError::Server(server_message(&value)));
        }
        serde_json::from_value(value).map_err(|_| ClientError::InvalidResponse)
    }
}
