//! Typed client for the admin API exposed by the gateway.
//!
//! # Responsibilities
//! - Call the list, approve/reject and user-update routes
//! - Carry the browser session cookie on every request
//! - Turn non-2xx responses into a readable message
//!
//! # Design Decisions
//! - Error text comes from the JSON `error` field, then `message`, then a
//!   fixed fallback; the fallback also covers bodies that are not JSON

pub mod filter;
pub mod types;

use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::types::{Items, RegistrationRequest, UpdatedUser, User, UserUpdate};

/// Message used when a failed response carries no usable error text.
pub const FALLBACK_ERROR: &str = "Request failed";

/// Errors returned by [`AdminClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid session cookie")]
    InvalidCookie,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Derive a user-facing message from an error response body.
pub fn read_error(body: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| {
            b.error
                .filter(|m| !m.is_empty())
                .or(b.message.filter(|m| !m.is_empty()))
        })
        .unwrap_or_else(|| FALLBACK_ERROR.to_string())
}

/// Client for the gateway's `/api/...` surface.
#[derive(Debug, Clone)]
pub struct AdminClient {
    base: String,
    http: reqwest::Client,
}

impl AdminClient {
    /// `base` is the gateway API root, e.g. `http://localhost:3000/api`.
    pub fn new(base: &str, cookie: Option<&str>) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie {
            let value = HeaderValue::from_str(cookie).map_err(|_| ClientError::InvalidCookie)?;
            headers.insert(COOKIE, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        Self::decode(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let mut request = self.http.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        Self::decode(request.send().await?).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: read_error(&body),
            });
        }
        Ok(response.json().await?)
    }

    /// List registration requests, optionally by status (e.g. `PENDING`).
    pub async fn registration_requests(
        &self,
        status: Option<&str>,
    ) -> Result<Vec<RegistrationRequest>, ClientError> {
        let query: Vec<(&str, &str)> = status.map(|s| ("status", s)).into_iter().collect();
        let page: Items<RegistrationRequest> =
            self.get("/admin/registration-requests", &query).await?;
        Ok(page.items)
    }

    pub async fn approve(&self, id: &str) -> Result<serde_json::Value, ClientError> {
        self.post::<_, ()>(&format!("/admin/registration-requests/{}/approve", id), None)
            .await
    }

    pub async fn reject(&self, id: &str) -> Result<serde_json::Value, ClientError> {
        self.post::<_, ()>(&format!("/admin/registration-requests/{}/reject", id), None)
            .await
    }

    pub async fn users(&self) -> Result<Vec<User>, ClientError> {
        let page: Items<User> = self.get("/admin/users", &[]).await?;
        Ok(page.items)
    }

    /// Update status and/or role. Posted to the gateway, which relays it
    /// upstream as a partial update.
    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<UpdatedUser, ClientError> {
        self.post(&format!("/admin/users/{}", id), Some(update)).await
    }

    pub async fn me(&self) -> Result<serde_json::Value, ClientError> {
        self.get("/auth/me", &[]).await
    }

    pub async fn refresh(&self) -> Result<serde_json::Value, ClientError> {
        self.post::<_, ()>("/auth/refresh", None).await
    }
}
