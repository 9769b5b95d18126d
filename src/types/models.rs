//! Domain models for the managed resource kinds.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Key, KeyAssignment, KeyValue, Model, ResourceName, SecretBearing};

/// A user account.
///
/// Created under the caller's key; an empty key lets the provider assign one.
#[derive(Debug, Clone)]
pub struct User<K = String> {
    pub key: Key<K>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Only sent on create and update, never returned by the provider.
    pub password: Option<SecretString>,
    pub email_verified: bool,
    pub blocked: bool,
}

impl<K> User<K> {
    pub fn new(key: Key<K>, email: impl Into<String>) -> Self {
        Self {
            key,
            email: email.into(),
            first_name: None,
            last_name: None,
            password: None,
            email_verified: false,
            blocked: false,
        }
    }

    pub fn with_name(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::new(password.into()));
        self
    }
}

impl<K: KeyValue> Model for User<K> {
    type KeyType = K;

    const RESOURCE: ResourceName = ResourceName::new("user", "users");

    const KEY_ASSIGNMENT: KeyAssignment = KeyAssignment::ProviderWhenUnset { prefix: "auth0|" };

    fn key(&self) -> &Key<K> {
        &self.key
    }

    fn set_key(&mut self, key: Key<K>) {
        self.key = key;
    }
}

/// Application type as understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    Native,
    Spa,
    RegularWeb,
    /// Machine-to-machine application.
    #[default]
    NonInteractive,
}

/// A registered application (OAuth client).
///
/// The provider assigns the key on create; the key of a model passed to `create` is ignored.
#[derive(Debug, Clone)]
pub struct Application<K = String> {
    pub key: Key<K>,
    pub name: String,
    pub description: Option<String>,
    pub app_type: ApplicationType,
    pub grant_types: Vec<String>,
    pub callbacks: Vec<String>,
    pub client_secret: Option<SecretString>,
}

impl<K> Application<K> {
    /// Machine-to-machine application using the client credentials grant.
    pub fn new(key: Key<K>, name: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            description: None,
            app_type: ApplicationType::NonInteractive,
            grant_types: vec!["client_credentials".to_string()],
            callbacks: Vec::new(),
            client_secret: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_app_type(mut self, app_type: ApplicationType) -> Self {
        self.app_type = app_type;
        self
    }
}

impl<K: KeyValue> Model for Application<K> {
    type KeyType = K;

    const RESOURCE: ResourceName = ResourceName::new("application", "applications");

    const KEY_ASSIGNMENT: KeyAssignment = KeyAssignment::Provider { prefix: "client_" };

    fn key(&self) -> &Key<K> {
        &self.key
    }

    fn set_key(&mut self, key: Key<K>) {
        self.key = key;
    }
}

impl<K: KeyValue> SecretBearing for Application<K> {
    fn client_secret(&self) -> Option<&SecretString> {
        self.client_secret.as_ref()
    }

    fn set_client_secret(&mut self, secret: SecretString) {
        self.client_secret = Some(secret);
    }
}

/// Authorization of an application to call an API with a set of scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant<K = String> {
    pub key: Key<K>,
    pub client_id: String,
    pub audience: String,
    pub scopes: Vec<String>,
}

impl<K> Grant<K> {
    pub fn new(
        key: Key<K>,
        client_id: impl Into<String>,
        audience: impl Into<String>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            key,
            client_id: client_id.into(),
            audience: audience.into(),
            scopes,
        }
    }
}

impl<K: KeyValue> Model for Grant<K> {
    type KeyType = K;

    const RESOURCE: ResourceName = ResourceName::new("grant", "grants");

    const KEY_ASSIGNMENT: KeyAssignment = KeyAssignment::Provider { prefix: "cgr_" };

    fn key(&self) -> &Key<K> {
        &self.key
    }

    fn set_key(&mut self, key: Key<K>) {
        self.key = key;
    }
}

/// Permission exposed by an API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiScope {
    pub value: String,
    pub description: Option<String>,
}

impl ApiScope {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: None,
        }
    }
}

/// A protected API (resource server).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Api<K = String> {
    pub key: Key<K>,
    /// Audience value clients request tokens for.
    pub identifier: String,
    pub name: String,
    pub scopes: Vec<ApiScope>,
    /// Access token lifetime in seconds.
    pub token_lifetime: Option<u32>,
}

impl<K> Api<K> {
    pub fn new(key: Key<K>, identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key,
            identifier: identifier.into(),
            name: name.into(),
            scopes: Vec::new(),
            token_lifetime: None,
        }
    }

    pub fn with_scope(mut self, scope: ApiScope) -> Self {
        self.scopes.push(scope);
        self
    }
}

impl<K: KeyValue> Model for Api<K> {
    type KeyType = K;

    const RESOURCE: ResourceName = ResourceName::new("api", "apis");

    const KEY_ASSIGNMENT: KeyAssignment = KeyAssignment::Provider { prefix: "rs_" };

    fn key(&self) -> &Key<K> {
        &self.key
    }

    fn set_key(&mut self, key: Key<K>) {
        self.key = key;
    }
}

/// Out-of-band record kept alongside a user under the same key.
#[derive(Debug, Clone, PartialEq)]
pub struct UserData<K = String> {
    pub key: Key<K>,
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl<K> UserData<K> {
    pub fn new(key: Key<K>) -> Self {
        Self {
            key,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }
}

impl<K: KeyValue> Model for UserData<K> {
    type KeyType = K;

    const RESOURCE: ResourceName = ResourceName::new("user data", "user data");

    fn key(&self) -> &Key<K> {
        &self.key
    }

    fn set_key(&mut self, key: Key<K>) {
        self.key = key;
    }
}
