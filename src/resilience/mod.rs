//! Resilience
//!
//! Rate-limit aware retry for calls to the management API.

mod retry;

pub use retry::RateLimitRetryExecutor;
