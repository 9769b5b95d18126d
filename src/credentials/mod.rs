//! Credentials
//!
//! Access token acquisition for management API calls. Stores ask the provider for a token
//! once per operation; caching and refresh are the provider's business.

mod client_credentials;

pub use client_credentials::{ClientCredentialsTokenProvider, DEFAULT_REFRESH_BUFFER};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::CredentialError;

/// Source of management API access tokens.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn get_token(&self) -> Result<SecretString, CredentialError>;
}

/// Provider that always hands out the same token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<SecretString, CredentialError> {
        Ok(self.token.clone())
    }
}
