//! Application manager.

use std::sync::Arc;

use crate::error::IdentityResult;
use crate::filter::Filter;
use crate::store::SecretRotatingStore;
use crate::types::{Application, Key, KeyValue, PagedResultSet};

/// Manager for applications, adding client secret rotation.
pub struct ApplicationManager<K: KeyValue = String> {
    store: Arc<dyn SecretRotatingStore<Application<K>>>,
}

impl<K: KeyValue> Clone for ApplicationManager<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<K: KeyValue> ApplicationManager<K> {
    pub fn new(store: Arc<dyn SecretRotatingStore<Application<K>>>) -> Self {
        Self { store }
    }

    pub async fn get_all(
        &self,
        page_index: u32,
        page_size: u32,
        filter: Option<&dyn Filter<Application<K>>>,
    ) -> IdentityResult<PagedResultSet<Application<K>>> {
        self.store.get_all(page_index, page_size, filter).await
    }

    pub async fn get_by_key(&self, key: &Key<K>) -> IdentityResult<Application<K>> {
        self.store.get_by_key(key).await
    }

    /// Register an application; the returned key is the provider-assigned client id.
    pub async fn create(&self, application: &Application<K>) -> IdentityResult<Key<K>> {
        self.store.create(application).await
    }

    pub async fn update(&self, key: &Key<K>, application: &Application<K>) -> IdentityResult<()> {
        self.store.update(key, application).await
    }

    pub async fn delete_by_key(&self, key: &Key<K>) -> IdentityResult<()> {
        self.store.delete_by_key(key).await
    }

    pub async fn rotate_client_secret(&self, key: &Key<K>) -> IdentityResult<Application<K>> {
        self.store.rotate_client_secret(key).await
    }
}
