//! Model capability set shared by every stored resource.

use secrecy::SecretString;

use super::{Key, KeyValue};

/// Display names of a resource kind, used in operation error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceName {
    pub singular: &'static str,
    pub plural: &'static str,
}

impl ResourceName {
    pub const fn new(singular: &'static str, plural: &'static str) -> Self {
        Self { singular, plural }
    }
}

/// Who decides the key of a newly created resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAssignment {
    /// The caller's key is stored as given.
    Caller,
    /// The provider assigns the key; the caller's key is ignored.
    Provider { prefix: &'static str },
    /// The provider assigns the key only when the caller's key is unset.
    ProviderWhenUnset { prefix: &'static str },
}

impl KeyAssignment {
    /// Prefix of the key to generate for a model created with `key`, or `None` to keep it.
    pub fn generated_prefix<K: KeyValue>(&self, key: &Key<K>) -> Option<&'static str> {
        match *self {
            Self::Caller => None,
            Self::Provider { prefix } => Some(prefix),
            Self::ProviderWhenUnset { prefix } => key.value().is_unset().then_some(prefix),
        }
    }
}

/// A resource that can be held by a store.
pub trait Model: Clone + Send + Sync + 'static {
    type KeyType: KeyValue;

    const RESOURCE: ResourceName;

    const KEY_ASSIGNMENT: KeyAssignment = KeyAssignment::Caller;

    fn key(&self) -> &Key<Self::KeyType>;

    fn set_key(&mut self, key: Key<Self::KeyType>);

    /// Return the model re-keyed to `key`.
    fn with_key(mut self, key: Key<Self::KeyType>) -> Self {
        self.set_key(key);
        self
    }
}

/// A resource that carries a rotatable client secret.
pub trait SecretBearing: Model {
    fn client_secret(&self) -> Option<&SecretString>;

    fn set_client_secret(&mut self, secret: SecretString);
}
