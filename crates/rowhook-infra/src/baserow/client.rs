//! BaserowClient -- concrete [`SubscriptionApi`] and [`ResourceLoader`] for Baserow.
//!
//! Authenticates with username/password against `/api/user/token-auth/` and
//! sends the returned JWT as `Authorization: JWT <token>`. The token is
//! cached until the service rejects it with a 401, after which the next
//! request logs in again. Failed requests are never retried.
//!
//! The password and token are wrapped in [`SecretString`] and never logged.
//! A client built without a password fails every authenticated call with
//! [`ApiError::Unauthorized`] before touching the network.
//!
//! Only webhook and listing responses map 404 to [`ApiError::NotFound`]. A
//! 404 from the login endpoint is reported as a plain status error, since it
//! says nothing about whether a webhook exists.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::RwLock;

use rowhook_core::remote::{ResourceLoader, SubscriptionApi};
use rowhook_types::config::GlobalConfig;
use rowhook_types::error::ApiError;
use rowhook_types::subscription::{NewSubscription, RemoteSubscription, ResourceOption};

use super::types::{
    CreateWebhookRequest, LoadedResource, TokenAuthRequest, TokenAuthResponse, to_options,
};

/// Baserow REST API client.
///
/// Does not derive Debug: it holds credentials.
pub struct BaserowClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: Option<SecretString>,
    token: RwLock<Option<Arc<SecretString>>>,
}

impl BaserowClient {
    /// Create a client for the Baserow instance at `base_url`.
    ///
    /// `timeout` bounds every request; an elapsed timeout surfaces as
    /// [`ApiError::Transport`].
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rowhook/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password,
            token: RwLock::new(None),
        })
    }

    /// Create a client from the `[baserow]` section of the global config.
    pub fn from_config(
        config: &GlobalConfig,
        password: Option<SecretString>,
    ) -> Result<Self, ApiError> {
        Self::new(
            &config.baserow.host,
            &config.baserow.username,
            password,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Return the cached JWT, logging in first if there is none.
    async fn token(&self) -> Result<Arc<SecretString>, ApiError> {
        if let Some(token) = self.token.read().await.as_ref() {
            return Ok(Arc::clone(token));
        }

        let mut slot = self.token.write().await;
        if let Some(token) = slot.as_ref() {
            return Ok(Arc::clone(token));
        }

        let token = Arc::new(self.login().await?);
        *slot = Some(Arc::clone(&token));
        Ok(token)
    }

    async fn login(&self) -> Result<SecretString, ApiError> {
        let Some(password) = &self.password else {
            tracing::warn!(host = %self.base_url, "no Baserow password configured");
            return Err(ApiError::Unauthorized);
        };
        tracing::debug!(host = %self.base_url, username = %self.username, "requesting Baserow token");

        let response = self
            .client
            .post(self.url("/api/user/token-auth/"))
            .json(&TokenAuthRequest {
                username: &self.username,
                password: password.expose_secret(),
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => ApiError::Unauthorized,
                code => ApiError::Status { status: code, body },
            });
        }

        let auth: TokenAuthResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("invalid token response: {e}")))?;

        auth.into_token()
            .map(SecretString::from)
            .ok_or_else(|| ApiError::Decode("token response did not contain a token".to_string()))
    }

    /// Send an authenticated request and decode the JSON body, if any.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError> {
        let token = self.token().await?;

        let mut builder = self
            .client
            .request(method.clone(), self.url(path))
            .header(AUTHORIZATION, format!("JWT {}", token.expose_secret()));
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        tracing::debug!(%method, path, status = response.status().as_u16(), "Baserow response");

        if response.status() == StatusCode::UNAUTHORIZED {
            self.token.write().await.take();
        }

        let bytes = check_status(response)
            .await?
            .bytes()
            .await
            .map_err(transport_error)?;
        if bytes.is_empty() {
            return Ok(None);
        }

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn list(&self, path: &str) -> Result<Vec<LoadedResource>, ApiError> {
        let body = self.request(Method::GET, path, None).await?;
        serde_json::from_value(body.unwrap_or(Value::Array(Vec::new())))
            .map_err(|e| ApiError::Decode(format!("unexpected listing from {path}: {e}")))
    }
}

fn transport_error(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

/// Classify a non-success response into an [`ApiError`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        404 => ApiError::NotFound,
        401 | 403 => ApiError::Unauthorized,
        code => ApiError::Status { status: code, body },
    })
}

impl SubscriptionApi for BaserowClient {
    async fn get_subscription(&self, id: &str) -> Result<RemoteSubscription, ApiError> {
        let body = self
            .request(Method::GET, &format!("/api/database/webhooks/{id}/"), None)
            .await?;
        Ok(RemoteSubscription::from_json(body.unwrap_or(Value::Null)))
    }

    async fn create_subscription(
        &self,
        request: &NewSubscription,
    ) -> Result<RemoteSubscription, ApiError> {
        let payload = serde_json::to_value(CreateWebhookRequest::from(request))
            .map_err(|e| ApiError::Decode(format!("failed to encode webhook request: {e}")))?;

        let body = self
            .request(
                Method::POST,
                &format!("/api/database/webhooks/table/{}/", request.table_id),
                Some(payload),
            )
            .await?;
        Ok(RemoteSubscription::from_json(body.unwrap_or(Value::Null)))
    }

    async fn delete_subscription(&self, id: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, &format!("/api/database/webhooks/{id}/"), None)
            .await?;
        Ok(())
    }
}

impl ResourceLoader for BaserowClient {
    async fn list_databases(&self) -> Result<Vec<ResourceOption>, ApiError> {
        let applications = self.list("/api/applications/").await?;
        Ok(to_options(
            applications
                .into_iter()
                .filter(|app| app.kind.as_deref() == Some("database"))
                .collect(),
        ))
    }

    async fn list_tables(&self, database_id: &str) -> Result<Vec<ResourceOption>, ApiError> {
        let tables = self
            .list(&format!("/api/database/tables/database/{database_id}/"))
            .await?;
        Ok(to_options(tables))
    }
}
