//! User mapping.

use secrecy::ExposeSecret;

use super::Mapper;
use crate::error::MappingError;
use crate::remote::wire::{UserCreateRequest, UserUpdateRequest, UserWire};
use crate::types::{Key, KeyValue, User};

/// Database connection users are created in unless configured otherwise.
pub const DEFAULT_USER_CONNECTION: &str = "Username-Password-Authentication";

/// Maps [`User`] to the management API user payloads of one connection.
#[derive(Debug, Clone)]
pub struct UserMapper {
    connection: String,
}

impl UserMapper {
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
        }
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }
}

impl Default for UserMapper {
    fn default() -> Self {
        Self::new(DEFAULT_USER_CONNECTION)
    }
}

impl<K: KeyValue> Mapper<User<K>> for UserMapper {
    type Wire = UserWire;
    type CreateRequest = UserCreateRequest;
    type UpdateRequest = UserUpdateRequest;

    fn to_domain(&self, wire: UserWire) -> Result<User<K>, MappingError> {
        Ok(User {
            key: Key::from_remote_id(&wire.user_id)?,
            email: wire
                .email
                .ok_or_else(|| MappingError::missing_field::<UserWire>("email"))?,
            first_name: wire.given_name,
            last_name: wire.family_name,
            password: None,
            email_verified: wire.email_verified,
            blocked: wire.blocked,
        })
    }

    fn to_create_request(&self, model: &User<K>) -> Result<UserCreateRequest, MappingError> {
        let password = model
            .password
            .as_ref()
            .ok_or_else(|| MappingError::missing_field::<User<K>>("password"))?;

        Ok(UserCreateRequest {
            user_id: Some(model.key.to_remote_id()).filter(|id| !id.is_empty()),
            connection: self.connection.clone(),
            email: model.email.clone(),
            password: password.expose_secret().clone(),
            given_name: model.first_name.clone(),
            family_name: model.last_name.clone(),
            email_verified: model.email_verified,
            blocked: model.blocked,
        })
    }

    fn to_update_request(&self, model: &User<K>) -> Result<UserUpdateRequest, MappingError> {
        let password = model.password.as_ref().map(|p| p.expose_secret().clone());
        Ok(UserUpdateRequest {
            email: Some(model.email.clone()),
            given_name: model.first_name.clone(),
            family_name: model.last_name.clone(),
            // The provider requires the connection whenever credentials change.
            connection: password.as_ref().map(|_| self.connection.clone()),
            password,
            email_verified: Some(model.email_verified),
            blocked: Some(model.blocked),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire() -> UserWire {
        UserWire {
            user_id: "42".into(),
            email: Some("ada@example.com".into()),
            given_name: Some("Ada".into()),
            family_name: Some("Lovelace".into()),
            email_verified: true,
            blocked: false,
        }
    }

    #[test]
    fn test_to_domain_parses_key_type() {
        let user: User<i64> = UserMapper::default().to_domain(wire()).unwrap();
        assert_eq!(user.key, Key::from(42_i64));
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
        assert!(user.password.is_none());
    }

    #[test]
    fn test_to_domain_requires_email() {
        let mut wire = wire();
        wire.email = None;

        let result: Result<User, _> = UserMapper::default().to_domain(wire);
        assert!(matches!(
            result,
            Err(MappingError::MissingField { field: "email", .. })
        ));
    }

    #[test]
    fn test_create_request_uses_connection() {
        let user = User::new(Key::from("ada"), "ada@example.com").with_password("pw");
        let request = UserMapper::new("corp-db").to_create_request(&user).unwrap();

        assert_eq!(request.connection, "corp-db");
        assert_eq!(request.user_id.as_deref(), Some("ada"));
        assert_eq!(request.password, "pw");
    }

    #[test]
    fn test_create_request_lets_provider_assign_empty_key() {
        let user = User::new(Key::from(""), "ada@example.com").with_password("pw");
        let request = UserMapper::default().to_create_request(&user).unwrap();
        assert!(request.user_id.is_none());
    }

    #[test]
    fn test_create_request_requires_password() {
        let user = User::new(Key::from("ada"), "ada@example.com");
        let err = UserMapper::default().to_create_request(&user).unwrap_err();
        assert!(matches!(err, MappingError::MissingField { field: "password", .. }));
    }

    #[test]
    fn test_update_request_connection_only_with_password() {
        let mapper = UserMapper::default();
        let user = User::new(Key::from("ada"), "ada@example.com");
        assert!(mapper.to_update_request(&user).unwrap().connection.is_none());

        let user = user.with_password("new-pw");
        let request = mapper.to_update_request(&user).unwrap();
        assert_eq!(request.connection.as_deref(), Some(DEFAULT_USER_CONNECTION));
        assert_eq!(request.password.as_deref(), Some("new-pw"));
    }
}
