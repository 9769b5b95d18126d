//! API (resource server) mapping.

use super::Mapper;
use crate::error::MappingError;
use crate::remote::wire::{
    ResourceServerCreateRequest, ResourceServerScope, ResourceServerUpdateRequest,
    ResourceServerWire,
};
use crate::types::{Api, ApiScope, Key, KeyValue};

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiMapper;

fn to_wire_scopes(scopes: &[ApiScope]) -> Vec<ResourceServerScope> {
    scopes
        .iter()
        .map(|scope| ResourceServerScope {
            value: scope.value.clone(),
            description: scope.description.clone(),
        })
        .collect()
}

impl<K: KeyValue> Mapper<Api<K>> for ApiMapper {
    type Wire = ResourceServerWire;
    type CreateRequest = ResourceServerCreateRequest;
    type UpdateRequest = ResourceServerUpdateRequest;

    fn to_domain(&self, wire: ResourceServerWire) -> Result<Api<K>, MappingError> {
        Ok(Api {
            key: Key::from_remote_id(&wire.id)?,
            // Unnamed resource servers are listed under their identifier.
            name: wire.name.unwrap_or_else(|| wire.identifier.clone()),
            identifier: wire.identifier,
            scopes: wire
                .scopes
                .into_iter()
                .map(|scope| ApiScope {
                    value: scope.value,
                    description: scope.description,
                })
                .collect(),
            token_lifetime: wire.token_lifetime,
        })
    }

    fn to_create_request(
        &self,
        model: &Api<K>,
    ) -> Result<ResourceServerCreateRequest, MappingError> {
        if model.identifier.is_empty() {
            return Err(MappingError::missing_field::<Api<K>>("identifier"));
        }
        Ok(ResourceServerCreateRequest {
            identifier: model.identifier.clone(),
            name: model.name.clone(),
            scopes: to_wire_scopes(&model.scopes),
            token_lifetime: model.token_lifetime,
        })
    }

    fn to_update_request(
        &self,
        model: &Api<K>,
    ) -> Result<ResourceServerUpdateRequest, MappingError> {
        Ok(ResourceServerUpdateRequest {
            name: model.name.clone(),
            scopes: to_wire_scopes(&model.scopes),
            token_lifetime: model.token_lifetime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_domain_defaults_name_to_identifier() {
        let api: Api = ApiMapper
            .to_domain(ResourceServerWire {
                id: "rs_1".into(),
                identifier: "https://orders.example.com".into(),
                name: None,
                scopes: vec![ResourceServerScope {
                    value: "read:orders".into(),
                    description: None,
                }],
                token_lifetime: Some(3600),
            })
            .unwrap();

        assert_eq!(api.name, "https://orders.example.com");
        assert_eq!(api.scopes, vec![ApiScope::new("read:orders")]);
    }

    #[test]
    fn test_create_requires_identifier() {
        let api = Api::new(Key::from(""), "", "Orders");
        assert!(matches!(
            ApiMapper.to_create_request(&api),
            Err(MappingError::MissingField { field: "identifier", .. })
        ));
    }
}
