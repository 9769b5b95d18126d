//! Configuration Types
//!
//! Rate-limit policy and identity provider connection settings.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default number of retries after the first rate-limited attempt.
pub const DEFAULT_MAX_RETRY_COUNT: u32 = 5;

/// Default fixed delay between rate-limited attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Default request timeout for management API and token calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What a store does when the provider signals rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitBehaviour {
    /// Give up on the first rate-limited attempt.
    Fail,
    /// Sleep for the retry interval and try again, up to the retry budget.
    #[default]
    Retry,
}

/// Rate-limit handling for remote stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub behaviour: RateLimitBehaviour,
    pub max_retry_count: u32,
    pub retry_interval: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            behaviour: RateLimitBehaviour::Retry,
            max_retry_count: DEFAULT_MAX_RETRY_COUNT,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl RateLimitPolicy {
    /// Fail on the first rate-limited attempt.
    pub fn fail_fast() -> Self {
        Self {
            behaviour: RateLimitBehaviour::Fail,
            ..Self::default()
        }
    }

    pub fn retry(max_retry_count: u32, retry_interval: Duration) -> Self {
        Self {
            behaviour: RateLimitBehaviour::Retry,
            max_retry_count,
            retry_interval,
        }
    }

    /// Upper bound on attempts for one operation against a provider that is always rate limited.
    pub fn max_attempts(&self) -> u32 {
        match self.behaviour {
            RateLimitBehaviour::Fail => 1,
            RateLimitBehaviour::Retry => self.max_retry_count.saturating_add(2),
        }
    }
}

/// Identity provider connection settings.
#[derive(Debug, Clone)]
pub struct IdentityProviderConfig {
    /// Tenant base URL, e.g. `https://tenant.example.com`.
    pub base_url: Url,
    pub client_id: String,
    pub client_secret: SecretString,
    /// Audience for management API tokens; defaults to the management URL.
    pub audience: Option<String>,
    pub timeout: Duration,
    pub rate_limit: RateLimitPolicy,
}

impl IdentityProviderConfig {
    /// Management API root (`<base>/api/v2/`).
    pub fn management_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/api/v2/");
        url.set_query(None);
        url
    }

    /// Token endpoint (`<base>/oauth/token`).
    pub fn token_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path("/oauth/token");
        url.set_query(None);
        url
    }

    pub fn effective_audience(&self) -> String {
        self.audience
            .clone()
            .unwrap_or_else(|| self.management_url().to_string())
    }
}
