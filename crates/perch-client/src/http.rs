//! Typed HTTP client for the Perch API.
//!
//! Thin reqwest wrapper: joins paths onto a base URL, keeps the session
//! cookie between calls, and converts every response into the error taxonomy
//! the data layer reports to the user. A body that will not parse as JSON is
//! an "invalid response", distinct from a server-declared error message.

use perch_api_types::GENERIC_ERROR_MESSAGE;
use reqwest::{Client, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Fixed route prefixes of the Perch API.
pub mod paths {
    pub const AUTH_SIGNUP: &str = "/api/auth/signup";
    pub const AUTH_LOGIN: &str = "/api/auth/login";
    pub const AUTH_LOGOUT: &str = "/api/auth/logout";
    pub const AUTH_ME: &str = "/api/auth/me";
    pub const USERS_UPDATE: &str = "/api/users/update";
    pub const POSTS_ALL: &str = "/api/posts/all";
    pub const NOTIFICATIONS: &str = "/api/notifications";
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// Local validation failure; never reaches the network.
    #[error("{0}")]
    Validation(String),
    /// The response body could not be parsed as JSON.
    #[error("invalid response from server")]
    InvalidResponse,
    /// Non-2xx response; carries the server-supplied message when present,
    /// otherwise the generic default.
    #[error("{0}")]
    Server(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(site: &str) -> Result<Self, ClientError> {
        let base = Url::parse(site)?.join("/")?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .cookie_store(true)
            .build()?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("perch-client/", env!("CARGO_PKG_VERSION"))
    }

    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base.join(path).map_err(ClientError::Url)
    }

    /// GET a JSON resource.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.send_get(path).await?;
        Self::handle(resp).await
    }

    /// GET a path and hand back the raw response.
    pub async fn send_get(&self, path: &str) -> Result<Response, ClientError> {
        let resp = self.client.get(self.url(path)?).send().await?;
        Ok(resp)
    }

    /// POST a JSON body and decode a JSON response.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let resp = self.send_json(path, body).await?;
        Self::handle(resp).await
    }

    /// POST a JSON body and hand back the raw response. Used by callers that
    /// need to inspect status and body themselves.
    pub async fn send_json<B>(&self, path: &str, body: &B) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let resp = self
            .client
            .post(self.url(path)?)
            .json(body)
            .send()
            .await?;
        Ok(resp)
    }

    /// Decode a response per the shared error contract.
    pub async fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|_| ClientError::InvalidResponse)?;
        if !status.is_success() {
            return Err(ClientError::Server(server_message(&value)));
        }
        serde_json::from_value(value).map_err(|_| ClientError::InvalidResponse)
    }
}

/// Pull the `error` field out of a failure body, falling back to the
/// generic default message.
pub fn server_message(value: &serde_json::Value) -> String {
    value
        .get("error")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_prefers_error_field() {
        let body = serde_json::json!({ "error": "Username is taken" });
        assert_eq!(server_message(&body), "Username is taken");
    }

    #[test]
    fn server_message_falls_back_to_generic() {
        let body = serde_json::json!({ "detail": "nope" });
        assert_eq!(server_message(&body), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn base_url_join_keeps_host() {
        let client = ApiClient::new("http://127.0.0.1:3000").unwrap();
        let url = client.url(paths::USERS_UPDATE).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3000/api/users/update");
    }
}
