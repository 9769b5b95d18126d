//! Services Builder
//!
//! Explicit wiring of stores into managers. Every resource kind gets a remote-backed store
//! over the management API unless an in-memory backend or an explicit store is chosen.

use std::sync::Arc;

use crate::credentials::{ClientCredentialsTokenProvider, CredentialProvider};
use crate::error::ConfigurationError;
use crate::manager::{ApiManager, ApplicationManager, GrantManager, ResourceManager, UserManager};
use crate::mapping::{
    ApiMapper, ApplicationMapper, GrantMapper, UserMapper, DEFAULT_USER_CONNECTION,
};
use crate::remote::ManagementApiClient;
use crate::store::{
    ApiStore, ApplicationStore, GrantStore, InMemoryStore, SecretRotatingStore, Store, UserStore,
};
use crate::types::{
    Api, Application, Grant, IdentityProviderConfig, RateLimitPolicy, User, UserData,
};

/// Managers for every resource kind.
#[derive(Clone)]
pub struct IdentityServices {
    pub users: UserManager,
    pub applications: ApplicationManager,
    pub grants: GrantManager,
    pub apis: ApiManager,
}

impl IdentityServices {
    pub fn builder() -> IdentityServicesBuilder {
        IdentityServicesBuilder::new()
    }
}

struct RemoteBackend {
    client: ManagementApiClient,
    credentials: Arc<dyn CredentialProvider>,
    rate_limit: RateLimitPolicy,
}

/// Builder for [`IdentityServices`].
#[derive(Default)]
pub struct IdentityServicesBuilder {
    config: Option<IdentityProviderConfig>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    user_connection: Option<String>,
    in_memory: bool,
    user_store: Option<Arc<dyn Store<User>>>,
    application_store: Option<Arc<dyn SecretRotatingStore<Application>>>,
    grant_store: Option<Arc<dyn Store<Grant>>>,
    api_store: Option<Arc<dyn Store<Api>>>,
    user_data_store: Option<Arc<dyn Store<UserData>>>,
}

impl IdentityServicesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use remote-backed stores for this tenant.
    pub fn config(mut self, config: IdentityProviderConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the token source (defaults to the client credentials grant).
    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Database connection new users are created in.
    pub fn user_connection(mut self, connection: impl Into<String>) -> Self {
        self.user_connection = Some(connection.into());
        self
    }

    /// Use in-memory stores for every resource kind without an explicit store.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    pub fn user_store(mut self, store: Arc<dyn Store<User>>) -> Self {
        self.user_store = Some(store);
        self
    }

    pub fn application_store(mut self, store: Arc<dyn SecretRotatingStore<Application>>) -> Self {
        self.application_store = Some(store);
        self
    }

    pub fn grant_store(mut self, store: Arc<dyn Store<Grant>>) -> Self {
        self.grant_store = Some(store);
        self
    }

    pub fn api_store(mut self, store: Arc<dyn Store<Api>>) -> Self {
        self.api_store = Some(store);
        self
    }

    /// Companion data store for the user manager.
    pub fn user_data_store(mut self, store: Arc<dyn Store<UserData>>) -> Self {
        self.user_data_store = Some(store);
        self
    }

    fn needs_remote(&self) -> bool {
        !self.in_memory
            && (self.user_store.is_none()
                || self.application_store.is_none()
                || self.grant_store.is_none()
                || self.api_store.is_none())
    }

    fn remote_backend(&self) -> Result<Option<RemoteBackend>, ConfigurationError> {
        if !self.needs_remote() {
            return Ok(None);
        }
        let config = self
            .config
            .as_ref()
            .ok_or(ConfigurationError::MissingField { field: "config" })?;

        let credentials: Arc<dyn CredentialProvider> = match &self.credentials {
            Some(credentials) => Arc::clone(credentials),
            None => Arc::new(ClientCredentialsTokenProvider::new(config)?),
        };

        Ok(Some(RemoteBackend {
            client: ManagementApiClient::new(config)?,
            credentials,
            rate_limit: config.rate_limit.clone(),
        }))
    }

    /// Build the managers.
    pub fn build(self) -> Result<IdentityServices, ConfigurationError> {
        let remote = self.remote_backend()?;
        let connection = self
            .user_connection
            .unwrap_or_else(|| DEFAULT_USER_CONNECTION.to_string());

        let users: Arc<dyn Store<User>> = match (self.user_store, &remote) {
            (Some(store), _) => store,
            (None, Some(backend)) => {
                let store: UserStore = UserStore::new(
                    Arc::new(backend.client.users()),
                    UserMapper::new(connection),
                    Arc::clone(&backend.credentials),
                    backend.rate_limit.clone(),
                );
                Arc::new(store)
            }
            (None, None) => Arc::new(InMemoryStore::<User>::new()),
        };

        let applications: Arc<dyn SecretRotatingStore<Application>> =
            match (self.application_store, &remote) {
                (Some(store), _) => store,
                (None, Some(backend)) => {
                    let store: ApplicationStore = ApplicationStore::new(
                        Arc::new(backend.client.applications()),
                        ApplicationMapper,
                        Arc::clone(&backend.credentials),
                        backend.rate_limit.clone(),
                    );
                    Arc::new(store)
                }
                (None, None) => Arc::new(InMemoryStore::<Application>::new()),
            };

        let grants: Arc<dyn Store<Grant>> = match (self.grant_store, &remote) {
            (Some(store), _) => store,
            (None, Some(backend)) => {
                let store: GrantStore = GrantStore::new(
                    Arc::new(backend.client.grants()),
                    GrantMapper,
                    Arc::clone(&backend.credentials),
                    backend.rate_limit.clone(),
                );
                Arc::new(store)
            }
            (None, None) => Arc::new(InMemoryStore::<Grant>::new()),
        };

        let apis: Arc<dyn Store<Api>> = match (self.api_store, &remote) {
            (Some(store), _) => store,
            (None, Some(backend)) => {
                let store: ApiStore = ApiStore::new(
                    Arc::new(backend.client.apis()),
                    ApiMapper,
                    Arc::clone(&backend.credentials),
                    backend.rate_limit.clone(),
                );
                Arc::new(store)
            }
            (None, None) => Arc::new(InMemoryStore::<Api>::new()),
        };

        let users = match self.user_data_store {
            Some(data) => UserManager::with_data_store(users, data),
            None => UserManager::new(users),
        };

        tracing::debug!(
            remote = remote.is_some(),
            user_data = users.has_data_store(),
            "Built identity services"
        );

        Ok(IdentityServices {
            users,
            applications: ApplicationManager::new(applications),
            grants: ResourceManager::new(grants),
            apis: ResourceManager::new(apis),
        })
    }
}
