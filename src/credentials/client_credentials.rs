//! Client Credentials Token Provider
//!
//! Obtains management API tokens with the client credentials grant and caches them until
//! shortly before they expire.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

use super::CredentialProvider;
use crate::error::{ConfigurationError, CredentialError};
use crate::types::IdentityProviderConfig;

/// How long before expiry a cached token is considered stale.
pub const DEFAULT_REFRESH_BUFFER: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

struct CachedToken {
    token: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn is_fresh(&self, buffer: Duration, now: DateTime<Utc>) -> bool {
        let buffer =
            chrono::Duration::from_std(buffer).unwrap_or_else(|_| chrono::Duration::zero());
        self.expires_at.map_or(true, |expires_at| now + buffer < expires_at)
    }
}

/// Client credentials grant against the tenant's token endpoint.
pub struct ClientCredentialsTokenProvider {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: SecretString,
    audience: String,
    refresh_buffer: Duration,
    cached: RwLock<Option<CachedToken>>,
}

impl ClientCredentialsTokenProvider {
    pub fn new(config: &IdentityProviderConfig) -> Result<Self, ConfigurationError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigurationError::InvalidValue {
                field: "http_client",
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            token_url: config.token_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            audience: config.effective_audience(),
            refresh_buffer: DEFAULT_REFRESH_BUFFER,
            cached: RwLock::new(None),
        })
    }

    pub fn with_refresh_buffer(mut self, refresh_buffer: Duration) -> Self {
        self.refresh_buffer = refresh_buffer;
        self
    }

    /// Drop the cached token so the next call requests a new one.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    async fn request_token(&self) -> Result<CachedToken, CredentialError> {
        let request = TokenRequest {
            grant_type: "client_credentials",
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            audience: &self.audience,
        };

        let response = self
            .http
            .post(self.token_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| CredentialError::RequestFailed {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CredentialError::RequestFailed {
                status: Some(status.as_u16()),
                message: token_error_message(&body),
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| CredentialError::InvalidResponse {
                message: e.to_string(),
            })?;

        let expires_at = body
            .expires_in
            .and_then(chrono::Duration::try_seconds)
            .map(|lifetime| Utc::now() + lifetime);

        tracing::debug!(
            client_id = %self.client_id,
            audience = %self.audience,
            expires_at = ?expires_at,
            "Obtained management API token"
        );

        Ok(CachedToken {
            token: SecretString::new(body.access_token),
            expires_at,
        })
    }
}

impl std::fmt::Debug for ClientCredentialsTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsTokenProvider")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("audience", &self.audience)
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for ClientCredentialsTokenProvider {
    async fn get_token(&self) -> Result<SecretString, CredentialError> {
        {
            let cached = self.cached.read().await;
            if let Some(cached) = cached.as_ref() {
                if cached.is_fresh(self.refresh_buffer, Utc::now()) {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another caller may have refreshed while we waited for the write lock.
        if let Some(current) = cached.as_ref() {
            if current.is_fresh(self.refresh_buffer, Utc::now()) {
                return Ok(current.token.clone());
            }
        }

        let fresh = self.request_token().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

fn token_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error_description")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
