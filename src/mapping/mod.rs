//! Mappers
//!
//! Translation between domain models and management API wire types. The wire and payload
//! types are associated types, so a store can only be paired with a mapper that produces
//! exactly what its remote collaborator consumes. Mappers for read-only use may skip the
//! payload methods; the defaults fail with [`MappingError::UnsupportedDestination`].

mod api;
mod application;
mod grant;
mod user;

pub use api::ApiMapper;
pub use application::ApplicationMapper;
pub use grant::GrantMapper;
pub use user::{UserMapper, DEFAULT_USER_CONNECTION};

use crate::error::MappingError;
use crate::types::Model;

/// Domain ↔ wire mapping for models of type `M`.
pub trait Mapper<M: Model>: Send + Sync {
    type Wire;
    type CreateRequest;
    type UpdateRequest;

    fn to_domain(&self, wire: Self::Wire) -> Result<M, MappingError>;

    fn to_create_request(&self, _model: &M) -> Result<Self::CreateRequest, MappingError> {
        Err(MappingError::unsupported::<Self, Self::CreateRequest>(
            "Mapper::to_create_request",
        ))
    }

    fn to_update_request(&self, _model: &M) -> Result<Self::UpdateRequest, MappingError> {
        Err(MappingError::unsupported::<Self, Self::UpdateRequest>(
            "Mapper::to_update_request",
        ))
    }
}
