//! Typed client for the webook HTTP API.
//!
//! Each call goes through the authenticated [`Transport`], so bearer
//! attachment, token rotation and the 401 redirect apply uniformly. The
//! envelope's `data` is returned on success; a non-zero envelope code
//! becomes [`TransportError::Api`].

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;

use crate::error::{Result, TransportError};
use crate::headers::bearer_value;
use crate::message::{ApiRequest, ApiResponse};
use crate::models::article::{ArticleItem, WithdrawRequest};
use crate::models::user::{EditProfileRequest, LoginRequest, Profile, SignupRequest};
use crate::models::{Envelope, ListRequest};
use crate::storage::{Credentials, REFRESH_TOKEN_KEY};
use crate::transport::Transport;

/// Default page size used by the list endpoints
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

pub struct WebookApi {
    transport: Arc<Transport>,
    credentials: Credentials,
}

impl WebookApi {
    pub fn new(transport: Arc<Transport>, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // ===== Account =====

    pub async fn signup(&self, email: &str, password: &str, confirm_password: &str) -> Result<String> {
        let body = SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        };
        let request = body
            .validate()
            .and_then(|_| ApiRequest::post("/users/signup").json(&body));
        let response = self.transport.execute(request).await?;
        envelope::<String>(&response)?.into_message()
    }

    /// Log in; the session tokens arrive in response headers and are stored
    /// by the rotation interceptor
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.transport.post_json("/users/login", &body).await?;
        let message = envelope::<String>(&response)?.into_message()?;
        tracing::info!(email = email, "Logged in");
        Ok(message)
    }

    /// Log out server-side, then forget the local session
    pub async fn logout(&self) -> Result<String> {
        let response = self
            .transport
            .post_json("/users/logout", &serde_json::json!({}))
            .await?;
        let message = envelope::<String>(&response)?.into_message()?;

        self.transport.defaults().remove(&AUTHORIZATION);
        if self.credentials.is_available() {
            self.credentials.clear()?;
        }
        tracing::info!("Logged out, local credentials cleared");
        Ok(message)
    }

    /// Exchange the stored refresh token for a new access token
    ///
    /// Sends `Authorization: Bearer <refresh_token>`; the rotated tokens in
    /// the response headers are captured by the rotation interceptor.
    pub async fn refresh_session(&self) -> Result<()> {
        let refresh_token = if self.credentials.is_available() {
            self.credentials.refresh_token()?
        } else {
            None
        };
        let refresh_token = refresh_token.ok_or(TransportError::MissingCredential(REFRESH_TOKEN_KEY))?;

        let request = ApiRequest::post("/users/refresh_token")
            .without_stored_token()
            .header(AUTHORIZATION.as_str(), &bearer_value(&refresh_token));

        let response = self.transport.execute(request).await?;
        envelope::<serde_json::Value>(&response)?.into_message()?;
        tracing::info!("Session refreshed");
        Ok(())
    }

    // ===== Profile =====

    pub async fn profile(&self) -> Result<Profile> {
        let response = self.transport.get("/users/profile").await?;
        Ok(envelope::<Profile>(&response)?.into_data()?.unwrap_or_default())
    }

    pub async fn edit_profile(&self, edit: &EditProfileRequest) -> Result<String> {
        let request = edit
            .validate()
            .and_then(|_| ApiRequest::post("/users/edit").json(edit));
        let response = self.transport.execute(request).await?;
        envelope::<String>(&response)?.into_message()
    }

    // ===== Articles =====

    /// The caller's own articles, any status
    pub async fn my_articles(&self, offset: i64, limit: i64) -> Result<Vec<ArticleItem>> {
        self.list("/articles/list", offset, limit).await
    }

    /// Published articles from every author; works without a session
    pub async fn published_articles(&self, offset: i64, limit: i64) -> Result<Vec<ArticleItem>> {
        self.list("/articles/pub/list", offset, limit).await
    }

    /// Take a published article back to the author's unpublished list
    ///
    /// Returns the id the server confirmed.
    pub async fn withdraw_article(&self, id: i64) -> Result<i64> {
        let response = self
            .transport
            .post_json("/articles/withdraw", &WithdrawRequest { id })
            .await?;
        let withdrawn = envelope::<i64>(&response)?.into_data()?.unwrap_or(id);
        tracing::info!(id = withdrawn, "Article withdrawn");
        Ok(withdrawn)
    }

    async fn list(&self, path: &str, offset: i64, limit: i64) -> Result<Vec<ArticleItem>> {
        let response = self
            .transport
            .post_json(path, &ListRequest { offset, limit })
            .await?;
        let items = envelope::<Vec<ArticleItem>>(&response)?
            .into_data()?
            .unwrap_or_default();
        tracing::debug!(path = path, count = items.len(), "Fetched article list");
        Ok(items)
    }
}

fn envelope<T: DeserializeOwned>(response: &ApiResponse) -> Result<Envelope<T>> {
    response.json()
}
