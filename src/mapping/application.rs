//! Application mapping.

use secrecy::SecretString;

use super::Mapper;
use crate::error::MappingError;
use crate::remote::wire::{ClientCreateRequest, ClientUpdateRequest, ClientWire};
use crate::types::{Application, Key, KeyValue};

/// Maps [`Application`] to management API client payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationMapper;

impl<K: KeyValue> Mapper<Application<K>> for ApplicationMapper {
    type Wire = ClientWire;
    type CreateRequest = ClientCreateRequest;
    type UpdateRequest = ClientUpdateRequest;

    fn to_domain(&self, wire: ClientWire) -> Result<Application<K>, MappingError> {
        Ok(Application {
            key: Key::from_remote_id(&wire.client_id)?,
            name: wire.name,
            description: wire.description,
            app_type: wire.app_type.unwrap_or_default(),
            grant_types: wire.grant_types,
            callbacks: wire.callbacks,
            client_secret: wire.client_secret.map(SecretString::new),
        })
    }

    fn to_create_request(
        &self,
        model: &Application<K>,
    ) -> Result<ClientCreateRequest, MappingError> {
        Ok(ClientCreateRequest {
            name: model.name.clone(),
            description: model.description.clone(),
            app_type: model.app_type,
            grant_types: model.grant_types.clone(),
            callbacks: model.callbacks.clone(),
        })
    }

    fn to_update_request(
        &self,
        model: &Application<K>,
    ) -> Result<ClientUpdateRequest, MappingError> {
        Ok(ClientUpdateRequest {
            name: model.name.clone(),
            description: model.description.clone(),
            app_type: model.app_type,
            grant_types: model.grant_types.clone(),
            callbacks: model.callbacks.clone(),
        })
    }
}
