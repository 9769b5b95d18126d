//! Generic resource manager.

use std::sync::Arc;

use crate::error::IdentityResult;
use crate::filter::Filter;
use crate::store::Store;
use crate::types::{Api, Grant, Key, Model, PagedResultSet};

pub type GrantManager<K = String> = ResourceManager<Grant<K>>;
pub type ApiManager<K = String> = ResourceManager<Api<K>>;

/// Manager that delegates every operation to its store.
pub struct ResourceManager<M: Model> {
    store: Arc<dyn Store<M>>,
}

impl<M: Model> Clone for ResourceManager<M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<M: Model> ResourceManager<M> {
    pub fn new(store: Arc<dyn Store<M>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store<M>> {
        &self.store
    }

    pub async fn get_all(
        &self,
        page_index: u32,
        page_size: u32,
        filter: Option<&dyn Filter<M>>,
    ) -> IdentityResult<PagedResultSet<M>> {
        self.store.get_all(page_index, page_size, filter).await
    }

    pub async fn get_by_key(&self, key: &Key<M::KeyType>) -> IdentityResult<M> {
        self.store.get_by_key(key).await
    }

    pub async fn create(&self, model: &M) -> IdentityResult<Key<M::KeyType>> {
        self.store.create(model).await
    }

    pub async fn update(&self, key: &Key<M::KeyType>, model: &M) -> IdentityResult<()> {
        self.store.update(key, model).await
    }

    pub async fn delete_by_key(&self, key: &Key<M::KeyType>) -> IdentityResult<()> {
        self.store.delete_by_key(key).await
    }
}
