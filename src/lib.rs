//! Identity Integration Module
//!
//! Identity management over an identity provider's management API: users, applications,
//! grants and APIs behind one store contract.
//!
//! # Features
//!
//! - Paged, filtered listing (`get_all`) plus get, create, update and idempotent delete
//! - Client secret rotation for applications
//! - Rate-limit handling per store: fail fast, or retry a bounded number of times at a fixed
//!   interval
//! - Typed read, create and update errors that keep the underlying cause
//! - Compile-time mappers between domain models and wire payloads
//! - User manager with an optional companion data store
//! - In-memory stores for tests and local development
//!
//! # Example
//!
//! ```rust,ignore
//! use identity_integration::{identity_config, EmailFilter, IdentityServices, Key, User};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = identity_config()
//!         .domain("tenant.example.com")
//!         .client_id("my-client-id")
//!         .client_secret("my-client-secret")
//!         .rate_limit_max_retry_count(3)
//!         .build()?;
//!
//!     let services = IdentityServices::builder().config(config).build()?;
//!
//!     let user = User::new(Key::from("ada"), "ada@example.com").with_password("s3cret!");
//!     let key = services.users.create(&user).await?;
//!
//!     let page = services
//!         .users
//!         .get_all(0, 50, Some(&EmailFilter::new("ada@example.com")))
//!         .await?;
//!     println!("{} match(es), more: {}", page.len(), page.has_next_page());
//!
//!     services.users.delete_by_key(&key).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: keys, models, paging and configuration
//! - `error`: error hierarchy
//! - `filter`: list filters and provider queries
//! - `mapping`: domain to wire mappers
//! - `remote`: management API collaborator and its HTTP implementation
//! - `credentials`: access token providers
//! - `resilience`: rate-limit retry
//! - `store`: the store contract with remote and in-memory backends
//! - `manager`: managers over stores
//! - `builders`: configuration and service wiring
//! - `mocks`: stateful management API fakes for tests

pub mod builders;
pub mod credentials;
pub mod error;
pub mod filter;
pub mod manager;
pub mod mapping;
pub mod mocks;
pub mod remote;
pub mod resilience;
pub mod store;
pub mod types;

// Re-export builders
pub use builders::{
    identity_config, IdentityProviderConfigBuilder, IdentityServices, IdentityServicesBuilder,
};

// Re-export errors
pub use error::{
    ConfigurationError, CredentialError, ErrorKind, FailureCause, FilterError, IdentityError,
    IdentityResult, MappingError, RemoteError, RemoteResult, StorageError,
};

// Re-export types
pub use types::{
    // Keys and models
    Api, ApiScope, Application, ApplicationType, Grant, Key, KeyValue, Model, ResourceName,
    SecretBearing, User, UserData,
    // Paging
    PageRequest, PagedResultSet,
    // Config
    IdentityProviderConfig, RateLimitBehaviour, RateLimitPolicy,
};

// Re-export filters and mappers
pub use filter::{EmailFilter, Filter, GrantFilter, ListQuery, PredicateFilter, QueryFilter};
pub use mapping::{ApiMapper, ApplicationMapper, GrantMapper, Mapper, UserMapper};

// Re-export stores and managers
pub use manager::{ApiManager, ApplicationManager, GrantManager, ResourceManager, UserManager};
pub use store::{
    ApiStore, ApplicationStore, GrantStore, InMemoryStore, RemoteStore, SecretRotatingStore,
    Store, UserStore,
};

// Re-export remote and credentials
pub use credentials::{ClientCredentialsTokenProvider, CredentialProvider, StaticTokenProvider};
pub use remote::{ManagementApiClient, RemoteResourceApi, RemoteSecretRotation, WirePage};
pub use resilience::RateLimitRetryExecutor;
