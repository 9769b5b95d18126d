//! User manager.

use std::sync::Arc;

use crate::error::{ConfigurationError, IdentityError, IdentityResult};
use crate::filter::Filter;
use crate::store::Store;
use crate::types::{Key, KeyValue, Model, PagedResultSet, User, UserData};

/// Manager for users, optionally paired with a store of companion data records kept under
/// the user's key.
pub struct UserManager<K: KeyValue = String, D: Model<KeyType = K> = UserData<K>> {
    users: Arc<dyn Store<User<K>>>,
    data: Option<Arc<dyn Store<D>>>,
}

impl<K: KeyValue, D: Model<KeyType = K>> Clone for UserManager<K, D> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            data: self.data.clone(),
        }
    }
}

impl<K: KeyValue, D: Model<KeyType = K>> UserManager<K, D> {
    pub fn new(users: Arc<dyn Store<User<K>>>) -> Self {
        Self { users, data: None }
    }

    pub fn with_data_store(users: Arc<dyn Store<User<K>>>, data: Arc<dyn Store<D>>) -> Self {
        Self {
            users,
            data: Some(data),
        }
    }

    pub fn has_data_store(&self) -> bool {
        self.data.is_some()
    }

    fn data_store(&self) -> IdentityResult<&Arc<dyn Store<D>>> {
        self.data.as_ref().ok_or(IdentityError::Configuration(
            ConfigurationError::MissingField {
                field: "data_store",
            },
        ))
    }

    pub async fn get_all(
        &self,
        page_index: u32,
        page_size: u32,
        filter: Option<&dyn Filter<User<K>>>,
    ) -> IdentityResult<PagedResultSet<User<K>>> {
        self.users.get_all(page_index, page_size, filter).await
    }

    pub async fn get_by_key(&self, key: &Key<K>) -> IdentityResult<User<K>> {
        self.users.get_by_key(key).await
    }

    pub async fn create(&self, user: &User<K>) -> IdentityResult<Key<K>> {
        self.users.create(user).await
    }

    /// Create the user, then its data record under the returned key.
    ///
    /// The data record is only written once the user exists. If writing it fails the user is
    /// left in place and the data store's error is returned.
    pub async fn create_with_data(&self, user: &User<K>, data: D) -> IdentityResult<Key<K>> {
        let data_store = self.data_store()?;

        let key = self.users.create(user).await?;
        let data = data.with_key(key.clone());
        if let Err(e) = data_store.create(&data).await {
            tracing::warn!(
                key = %key,
                error = %e,
                "User created but its data record was not"
            );
            return Err(e);
        }
        Ok(key)
    }

    pub async fn update(&self, key: &Key<K>, user: &User<K>) -> IdentityResult<()> {
        self.users.update(key, user).await
    }

    /// Delete the user and, when a data store is configured, its data record.
    pub async fn delete_by_key(&self, key: &Key<K>) -> IdentityResult<()> {
        self.users.delete_by_key(key).await?;
        if let Some(data_store) = &self.data {
            data_store.delete_by_key(key).await?;
        }
        Ok(())
    }

    pub async fn get_data(&self, key: &Key<K>) -> IdentityResult<D> {
        self.data_store()?.get_by_key(key).await
    }

    pub async fn update_data(&self, key: &Key<K>, data: &D) -> IdentityResult<()> {
        self.data_store()?.update(key, data).await
    }
}
