//! In-memory store.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use secrecy::SecretString;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use super::{SecretRotatingStore, Store};
use crate::error::{FailureCause, IdentityError, IdentityResult, StorageError};
use crate::filter::Filter;
use crate::types::{Key, KeyValue, Model, PageRequest, PagedResultSet, SecretBearing};

const CLIENT_SECRET_BYTES: usize = 48;

/// Store keeping models in memory, in insertion order.
///
/// Filters are applied with [`Filter::matches`]; a filter that only builds provider queries
/// fails the listing. Keys the provider would assign (see [`Model::KEY_ASSIGNMENT`]) are
/// generated from a per-store sequence.
pub struct InMemoryStore<M: Model> {
    entries: RwLock<Vec<M>>,
    sequence: AtomicU64,
}

impl<M: Model> InMemoryStore<M> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Create a store pre-populated with `models`.
    pub fn with_models(models: Vec<M>) -> Self {
        Self {
            entries: RwLock::new(models),
            sequence: AtomicU64::new(0),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    fn next_key(&self, entries: &[M], prefix: &str) -> Key<M::KeyType> {
        loop {
            let sequence = self.sequence.fetch_add(1, Ordering::Relaxed).saturating_add(1);
            let key = Key::new(M::KeyType::from_sequence(prefix, sequence));
            if !entries.iter().any(|existing| existing.key() == &key) {
                return key;
            }
        }
    }
}

impl<M: Model> Default for InMemoryStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M: Model> Store<M> for InMemoryStore<M> {
    async fn get_all(
        &self,
        page_index: u32,
        page_size: u32,
        filter: Option<&dyn Filter<M>>,
    ) -> IdentityResult<PagedResultSet<M>> {
        if page_size == 0 {
            return Err(IdentityError::read_all::<M>(FailureCause::InvalidPageSize));
        }
        let page = PageRequest::new(page_index, page_size);
        let entries = self.entries.read().await;

        let mut matching = Vec::with_capacity(entries.len());
        for model in entries.iter() {
            let keep = match filter {
                Some(filter) => filter
                    .matches(model)
                    .map_err(|e| IdentityError::read_all::<M>(e))?,
                None => true,
            };
            if keep {
                matching.push(model);
            }
        }

        let total = matching.len() as u64;
        let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(skip)
            .take(page_size as usize)
            .cloned()
            .collect();

        Ok(PagedResultSet::from_total(items, page, total))
    }

    async fn get_by_key(&self, key: &Key<M::KeyType>) -> IdentityResult<M> {
        self.entries
            .read()
            .await
            .iter()
            .find(|model| model.key() == key)
            .cloned()
            .ok_or_else(|| IdentityError::read_one::<M>(key, StorageError::key_not_found(key)))
    }

    async fn create(&self, model: &M) -> IdentityResult<Key<M::KeyType>> {
        let mut entries = self.entries.write().await;
        let key = match M::KEY_ASSIGNMENT.generated_prefix(model.key()) {
            Some(prefix) => self.next_key(&entries, prefix),
            None => model.key().clone(),
        };
        if entries.iter().any(|existing| existing.key() == &key) {
            return Err(IdentityError::create::<M>(StorageError::duplicate_key(&key)));
        }
        entries.push(model.clone().with_key(key.clone()));
        Ok(key)
    }

    async fn update(&self, key: &Key<M::KeyType>, model: &M) -> IdentityResult<()> {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|existing| existing.key() == key) {
            Some(slot) => {
                *slot = model.clone().with_key(key.clone());
                Ok(())
            }
            None => Err(IdentityError::update::<M>(key, StorageError::key_not_found(key))),
        }
    }

    async fn delete_by_key(&self, key: &Key<M::KeyType>) -> IdentityResult<()> {
        self.entries
            .write()
            .await
            .retain(|existing| existing.key() != key);
        Ok(())
    }
}

#[async_trait]
impl<M: SecretBearing> SecretRotatingStore<M> for InMemoryStore<M> {
    async fn rotate_client_secret(&self, key: &Key<M::KeyType>) -> IdentityResult<M> {
        let mut entries = self.entries.write().await;
        let model = entries
            .iter_mut()
            .find(|existing| existing.key() == key)
            .ok_or_else(|| IdentityError::update::<M>(key, StorageError::key_not_found(key)))?;

        model.set_client_secret(generate_client_secret());
        Ok(model.clone())
    }
}

fn generate_client_secret() -> SecretString {
    let mut bytes = [0u8; CLIENT_SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    SecretString::new(URL_SAFE_NO_PAD.encode(bytes))
}
