//! Grant mapping.

use super::Mapper;
use crate::error::MappingError;
use crate::remote::wire::{ClientGrantCreateRequest, ClientGrantUpdateRequest, ClientGrantWire};
use crate::types::{Grant, Key, KeyValue};

#[derive(Debug, Clone, Copy, Default)]
pub struct GrantMapper;

impl<K: KeyValue> Mapper<Grant<K>> for GrantMapper {
    type Wire = ClientGrantWire;
    type CreateRequest = ClientGrantCreateRequest;
    type UpdateRequest = ClientGrantUpdateRequest;

    fn to_domain(&self, wire: ClientGrantWire) -> Result<Grant<K>, MappingError> {
        Ok(Grant {
            key: Key::from_remote_id(&wire.id)?,
            client_id: wire.client_id,
            audience: wire.audience,
            scopes: wire.scope,
        })
    }

    fn to_create_request(
        &self,
        model: &Grant<K>,
    ) -> Result<ClientGrantCreateRequest, MappingError> {
        Ok(ClientGrantCreateRequest {
            client_id: model.client_id.clone(),
            audience: model.audience.clone(),
            scope: model.scopes.clone(),
        })
    }

    /// Only the scopes of a grant can change.
    fn to_update_request(
        &self,
        model: &Grant<K>,
    ) -> Result<ClientGrantUpdateRequest, MappingError> {
        Ok(ClientGrantUpdateRequest {
            scope: model.scopes.clone(),
        })
    }
}
