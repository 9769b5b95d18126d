//! Resource keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

use crate::error::MappingError;

/// Opaque identifier of a stored resource.
///
/// Two keys are equal exactly when their wrapped values are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key<T>(T);

impl<T> Key<T> {
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: fmt::Display> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Key<String> {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Key<String> {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for Key<i64> {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<u64> for Key<u64> {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Primitive values that can back a [`Key`].
///
/// The management API addresses every resource by a string id, so a key value must render to
/// one and parse back from one.
pub trait KeyValue: Clone + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static {
    fn to_remote_id(&self) -> String {
        self.to_string()
    }

    fn from_remote_id(id: &str) -> Result<Self, MappingError>;

    /// Value for the `sequence`-th key handed out locally in place of the provider.
    fn from_sequence(prefix: &str, sequence: u64) -> Self;

    /// Whether this value stands for "no key yet".
    fn is_unset(&self) -> bool {
        false
    }
}

impl KeyValue for String {
    fn from_remote_id(id: &str) -> Result<Self, MappingError> {
        if id.is_empty() {
            return Err(MappingError::InvalidKey {
                value: String::new(),
                message: "identifier is empty".to_string(),
            });
        }
        Ok(id.to_string())
    }

    fn from_sequence(prefix: &str, sequence: u64) -> Self {
        format!("{prefix}{sequence}")
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl KeyValue for i64 {
    fn from_remote_id(id: &str) -> Result<Self, MappingError> {
        id.parse().map_err(|e: std::num::ParseIntError| MappingError::InvalidKey {
            value: id.to_string(),
            message: e.to_string(),
        })
    }

    fn from_sequence(_prefix: &str, sequence: u64) -> Self {
        i64::try_from(sequence).unwrap_or(i64::MAX)
    }
}

impl KeyValue for u64 {
    fn from_remote_id(id: &str) -> Result<Self, MappingError> {
        id.parse().map_err(|e: std::num::ParseIntError| MappingError::InvalidKey {
            value: id.to_string(),
            message: e.to_string(),
        })
    }

    fn from_sequence(_prefix: &str, sequence: u64) -> Self {
        sequence
    }
}

impl<T: KeyValue> Key<T> {
    /// Identifier used to address this key on the management API.
    pub fn to_remote_id(&self) -> String {
        self.0.to_remote_id()
    }

    pub fn from_remote_id(id: &str) -> Result<Self, MappingError> {
        T::from_remote_id(id).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_by_value() {
        assert_eq!(Key::from("a"), Key::new("a".to_string()));
        assert_ne!(Key::from("a"), Key::from("b"));

        let set: HashSet<_> = [Key::from(1_i64), Key::from(1_i64), Key::from(2_i64)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display_renders_value() {
        assert_eq!(Key::from("auth0|abc").to_string(), "auth0|abc");
        assert_eq!(Key::from(42_u64).to_string(), "42");
    }

    #[test]
    fn test_remote_id_round_trip() {
        let key = Key::<i64>::from_remote_id("17").unwrap();
        assert_eq!(key, Key::from(17_i64));
        assert_eq!(key.to_remote_id(), "17");
    }

    #[test]
    fn test_invalid_remote_id() {
        let err = Key::<u64>::from_remote_id("not-a-number").unwrap_err();
        assert!(matches!(err, MappingError::InvalidKey { value, .. } if value == "not-a-number"));

        assert!(Key::<String>::from_remote_id("").is_err());
    }

    #[test]
    fn test_sequence_keys() {
        assert_eq!(String::from_sequence("client_", 3), "client_3");
        assert_eq!(i64::from_sequence("client_", 3), 3);
        assert!(String::new().is_unset());
        assert!(!0_u64.is_unset());
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Key::from("u1")).unwrap();
        assert_eq!(json, "\"u1\"");
    }
}
