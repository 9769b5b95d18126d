//! Configuration Builder
//!
//! Fluent builder for identity provider configuration.

use secrecy::SecretString;
use std::time::Duration;
use url::Url;

use crate::error::ConfigurationError;
use crate::types::{
    IdentityProviderConfig, RateLimitBehaviour, RateLimitPolicy, DEFAULT_TIMEOUT,
};

/// Identity provider configuration builder.
#[derive(Default)]
pub struct IdentityProviderConfigBuilder {
    domain: Option<String>,
    base_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    audience: Option<String>,
    timeout: Option<Duration>,
    rate_limit: RateLimitPolicy,
}

impl IdentityProviderConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set tenant domain (`tenant.example.com`); the base URL becomes `https://<domain>`.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set an explicit tenant base URL. Takes precedence over [`domain`](Self::domain).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    /// Set the audience of management API tokens.
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = policy;
        self
    }

    pub fn rate_limit_behaviour(mut self, behaviour: RateLimitBehaviour) -> Self {
        self.rate_limit.behaviour = behaviour;
        self
    }

    pub fn rate_limit_max_retry_count(mut self, max_retry_count: u32) -> Self {
        self.rate_limit.max_retry_count = max_retry_count;
        self
    }

    pub fn rate_limit_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.rate_limit.retry_interval = retry_interval;
        self
    }

    /// Build configuration.
    pub fn build(self) -> Result<IdentityProviderConfig, ConfigurationError> {
        let raw_url = match (self.base_url, self.domain) {
            (Some(base_url), _) => base_url,
            (None, Some(domain)) => format!("https://{}", domain.trim_end_matches('/')),
            (None, None) => return Err(ConfigurationError::MissingField { field: "domain" }),
        };
        let base_url = Url::parse(&raw_url)
            .map_err(|_| ConfigurationError::InvalidEndpoint { url: raw_url.clone() })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ConfigurationError::InvalidEndpoint { url: raw_url });
        }

        let client_id = self
            .client_id
            .filter(|id| !id.is_empty())
            .ok_or(ConfigurationError::MissingField { field: "client_id" })?;
        let client_secret = self
            .client_secret
            .ok_or(ConfigurationError::MissingField {
                field: "client_secret",
            })?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidValue {
                field: "timeout",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(IdentityProviderConfig {
            base_url,
            client_id,
            client_secret,
            audience: self.audience,
            timeout,
            rate_limit: self.rate_limit,
        })
    }
}

/// Create a new configuration builder.
pub fn identity_config() -> IdentityProviderConfigBuilder {
    IdentityProviderConfigBuilder::new()
}
