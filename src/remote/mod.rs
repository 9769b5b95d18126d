//! Remote Management API
//!
//! The collaborator that talks to the identity provider. Stores only see the
//! [`RemoteResourceApi`] trait; [`ManagementApiClient`] is the HTTP implementation.

mod http;
pub mod wire;

pub use http::{
    ApiResourceApi, ApplicationResourceApi, GrantResourceApi, HttpResourceApi,
    ManagementApiClient, UserResourceApi,
};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::RemoteResult;
use crate::filter::ListQuery;
use crate::types::PageRequest;

/// One page of wire items plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct WirePage<W> {
    pub items: Vec<W>,
    pub total: u64,
}

/// CRUD access to one resource kind on the management API.
#[async_trait]
pub trait RemoteResourceApi: Send + Sync {
    type Wire: Send + 'static;
    type CreateRequest: Send + Sync + 'static;
    type UpdateRequest: Send + Sync + 'static;

    async fn get(&self, token: &SecretString, id: &str) -> RemoteResult<Self::Wire>;

    async fn list(
        &self,
        token: &SecretString,
        query: &ListQuery,
        page: PageRequest,
    ) -> RemoteResult<WirePage<Self::Wire>>;

    async fn create(
        &self,
        token: &SecretString,
        request: &Self::CreateRequest,
    ) -> RemoteResult<Self::Wire>;

    async fn update(
        &self,
        token: &SecretString,
        id: &str,
        request: &Self::UpdateRequest,
    ) -> RemoteResult<()>;

    /// Delete by id. A missing id is not an error.
    async fn delete(&self, token: &SecretString, id: &str) -> RemoteResult<()>;
}

/// Client secret rotation.
#[async_trait]
pub trait RemoteSecretRotation: RemoteResourceApi {
    async fn rotate_secret(&self, token: &SecretString, id: &str) -> RemoteResult<Self::Wire>;
}
