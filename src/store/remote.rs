//! Remote Store
//!
//! Store backed by the provider's management API. Every operation:
//!
//! 1. maps the domain model to its wire payload (create/update) or builds the list query,
//! 2. obtains one access token from the [`CredentialProvider`],
//! 3. runs the remote call under the store's rate-limit policy,
//! 4. maps the response back to the domain model,
//!
//! and wraps any failure in the operation's typed error.

use async_trait::async_trait;
use secrecy::SecretString;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{SecretRotatingStore, Store};
use crate::credentials::CredentialProvider;
use crate::error::{FailureCause, IdentityError, IdentityResult};
use crate::filter::{Filter, ListQuery};
use crate::mapping::{ApiMapper, ApplicationMapper, GrantMapper, Mapper, UserMapper};
use crate::remote::{
    ApiResourceApi, ApplicationResourceApi, GrantResourceApi, RemoteResourceApi,
    RemoteSecretRotation, UserResourceApi,
};
use crate::resilience::RateLimitRetryExecutor;
use crate::types::{
    Api, Application, Grant, Key, Model, PageRequest, PagedResultSet, RateLimitPolicy, User,
};

pub type UserStore<K = String> = RemoteStore<User<K>, UserResourceApi, UserMapper>;
pub type ApplicationStore<K = String> =
    RemoteStore<Application<K>, ApplicationResourceApi, ApplicationMapper>;
pub type GrantStore<K = String> = RemoteStore<Grant<K>, GrantResourceApi, GrantMapper>;
pub type ApiStore<K = String> = RemoteStore<Api<K>, ApiResourceApi, ApiMapper>;

/// Store for models of type `M` over a remote collaborator `R` with mapper `Mp`.
///
/// Holds no per-call state: one instance can serve concurrent callers, each with its own
/// retry budget.
pub struct RemoteStore<M, R, Mp> {
    remote: Arc<R>,
    mapper: Mp,
    credentials: Arc<dyn CredentialProvider>,
    retry: RateLimitRetryExecutor,
    _model: PhantomData<fn() -> M>,
}

impl<M, R, Mp> RemoteStore<M, R, Mp>
where
    M: Model,
    R: RemoteResourceApi,
    Mp: Mapper<
        M,
        Wire = R::Wire,
        CreateRequest = R::CreateRequest,
        UpdateRequest = R::UpdateRequest,
    >,
{
    pub fn new(
        remote: Arc<R>,
        mapper: Mp,
        credentials: Arc<dyn CredentialProvider>,
        rate_limit: RateLimitPolicy,
    ) -> Self {
        Self {
            remote,
            mapper,
            credentials,
            retry: RateLimitRetryExecutor::new(rate_limit),
            _model: PhantomData,
        }
    }

    pub fn rate_limit_policy(&self) -> &RateLimitPolicy {
        self.retry.policy()
    }

    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    async fn token(&self) -> Result<SecretString, FailureCause> {
        Ok(self.credentials.get_token().await?)
    }

    async fn fetch_page(
        &self,
        page: PageRequest,
        filter: Option<&dyn Filter<M>>,
    ) -> Result<PagedResultSet<M>, FailureCause> {
        if page.size == 0 {
            return Err(FailureCause::InvalidPageSize);
        }
        let query = match filter {
            Some(filter) => filter.to_query()?,
            None => ListQuery::default(),
        };
        let token = self.token().await?;

        let (remote, token, query) = (self.remote.as_ref(), &token, &query);
        let wire_page = self
            .retry
            .execute(M::RESOURCE.plural, "get_all", move || {
                remote.list(token, query, page)
            })
            .await?;

        let items = wire_page
            .items
            .into_iter()
            .map(|wire| self.mapper.to_domain(wire))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PagedResultSet::from_total(items, page, wire_page.total))
    }

    async fn fetch_one(&self, key: &Key<M::KeyType>) -> Result<M, FailureCause> {
        let token = self.token().await?;
        let id = key.to_remote_id();

        let (remote, token, id) = (self.remote.as_ref(), &token, id.as_str());
        let wire = self
            .retry
            .execute(M::RESOURCE.plural, "get_by_key", move || remote.get(token, id))
            .await?;

        Ok(self.mapper.to_domain(wire)?)
    }

    async fn submit_create(&self, model: &M) -> Result<Key<M::KeyType>, FailureCause> {
        let request = self.mapper.to_create_request(model)?;
        let token = self.token().await?;

        let (remote, token, request) = (self.remote.as_ref(), &token, &request);
        let wire = self
            .retry
            .execute(M::RESOURCE.plural, "create", move || {
                remote.create(token, request)
            })
            .await?;

        let created = self.mapper.to_domain(wire)?;
        Ok(created.key().clone())
    }

    async fn submit_update(&self, key: &Key<M::KeyType>, model: &M) -> Result<(), FailureCause> {
        let request = self.mapper.to_update_request(model)?;
        let token = self.token().await?;
        let id = key.to_remote_id();

        let (remote, token, id, request) = (self.remote.as_ref(), &token, id.as_str(), &request);
        self.retry
            .execute(M::RESOURCE.plural, "update", move || {
                remote.update(token, id, request)
            })
            .await?;
        Ok(())
    }

    async fn submit_delete(&self, key: &Key<M::KeyType>) -> Result<(), FailureCause> {
        let token = self.token().await?;
        let id = key.to_remote_id();

        let (remote, token, id) = (self.remote.as_ref(), &token, id.as_str());
        self.retry
            .execute(M::RESOURCE.plural, "delete_by_key", move || {
                remote.delete(token, id)
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<M, R, Mp> Store<M> for RemoteStore<M, R, Mp>
where
    M: Model,
    R: RemoteResourceApi + 'static,
    Mp: Mapper<
        M,
        Wire = R::Wire,
        CreateRequest = R::CreateRequest,
        UpdateRequest = R::UpdateRequest,
    > + 'static,
{
    async fn get_all(
        &self,
        page_index: u32,
        page_size: u32,
        filter: Option<&dyn Filter<M>>,
    ) -> IdentityResult<PagedResultSet<M>> {
        tracing::debug!(
            resource = M::RESOURCE.plural,
            page_index,
            page_size,
            filtered = filter.is_some(),
            "Listing resources"
        );
        self.fetch_page(PageRequest::new(page_index, page_size), filter)
            .await
            .map_err(|cause| IdentityError::read_all::<M>(cause))
    }

    async fn get_by_key(&self, key: &Key<M::KeyType>) -> IdentityResult<M> {
        tracing::debug!(resource = M::RESOURCE.singular, key = %key, "Reading resource");
        self.fetch_one(key)
            .await
            .map_err(|cause| IdentityError::read_one::<M>(key, cause))
    }

    async fn create(&self, model: &M) -> IdentityResult<Key<M::KeyType>> {
        tracing::debug!(resource = M::RESOURCE.singular, "Creating resource");
        let key = self
            .submit_create(model)
            .await
            .map_err(|cause| IdentityError::create::<M>(cause))?;
        tracing::debug!(resource = M::RESOURCE.singular, key = %key, "Created resource");
        Ok(key)
    }

    async fn update(&self, key: &Key<M::KeyType>, model: &M) -> IdentityResult<()> {
        tracing::debug!(resource = M::RESOURCE.singular, key = %key, "Updating resource");
        self.submit_update(key, model)
            .await
            .map_err(|cause| IdentityError::update::<M>(key, cause))
    }

    async fn delete_by_key(&self, key: &Key<M::KeyType>) -> IdentityResult<()> {
        tracing::debug!(resource = M::RESOURCE.singular, key = %key, "Deleting resource");
        self.submit_delete(key)
            .await
            .map_err(|cause| IdentityError::delete::<M>(key, cause))
    }
}

#[async_trait]
impl<M, R, Mp> SecretRotatingStore<M> for RemoteStore<M, R, Mp>
where
    M: Model,
    R: RemoteSecretRotation + 'static,
    Mp: Mapper<
        M,
        Wire = R::Wire,
        CreateRequest = R::CreateRequest,
        UpdateRequest = R::UpdateRequest,
    > + 'static,
{
    async fn rotate_client_secret(&self, key: &Key<M::KeyType>) -> IdentityResult<M> {
        tracing::debug!(resource = M::RESOURCE.singular, key = %key, "Rotating client secret");

        let rotate = async {
            let token = self.token().await?;
            let id = key.to_remote_id();

            let (remote, token, id) = (self.remote.as_ref(), &token, id.as_str());
            let wire = self
                .retry
                .execute(M::RESOURCE.plural, "rotate_client_secret", move || {
                    remote.rotate_secret(token, id)
                })
                .await?;

            Ok::<M, FailureCause>(self.mapper.to_domain(wire)?)
        };

        rotate
            .await
            .map_err(|cause| IdentityError::update::<M>(key, cause))
    }
}
