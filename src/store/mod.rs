//! Stores
//!
//! The CRUD and paging contract every backend implements, plus the remote-backed and
//! in-memory backends.

mod in_memory;
mod remote;

pub use in_memory::InMemoryStore;
pub use remote::{ApiStore, ApplicationStore, GrantStore, RemoteStore, UserStore};

use async_trait::async_trait;

use crate::error::IdentityResult;
use crate::filter::Filter;
use crate::types::{Key, Model, PagedResultSet};

/// Storage of models of type `M`.
#[async_trait]
pub trait Store<M: Model>: Send + Sync {
    /// List one page of models, optionally filtered.
    async fn get_all(
        &self,
        page_index: u32,
        page_size: u32,
        filter: Option<&dyn Filter<M>>,
    ) -> IdentityResult<PagedResultSet<M>>;

    async fn get_by_key(&self, key: &Key<M::KeyType>) -> IdentityResult<M>;

    /// Create a model and return the key it is stored under.
    async fn create(&self, model: &M) -> IdentityResult<Key<M::KeyType>>;

    async fn update(&self, key: &Key<M::KeyType>, model: &M) -> IdentityResult<()>;

    /// Delete by key. Deleting a key that does not exist succeeds.
    async fn delete_by_key(&self, key: &Key<M::KeyType>) -> IdentityResult<()>;
}

/// Store whose models carry a client secret that can be rotated.
#[async_trait]
pub trait SecretRotatingStore<M: Model>: Store<M> {
    /// Replace the client secret and return the model with the new secret.
    async fn rotate_client_secret(&self, key: &Key<M::KeyType>) -> IdentityResult<M>;
}
