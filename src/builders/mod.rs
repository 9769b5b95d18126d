//! Builders
//!
//! Fluent builders for configuration and service wiring.

mod config;
mod services;

pub use config::{identity_config, IdentityProviderConfigBuilder};
pub use services::{IdentityServices, IdentityServicesBuilder};
