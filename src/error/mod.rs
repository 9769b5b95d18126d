//! Identity Error Types
//!
//! Every store operation fails with one of three typed errors (read, create, update), each
//! carrying the message for the failed operation and the underlying [`FailureCause`].

use std::time::Duration;
use thiserror::Error;

use crate::types::{Key, KeyValue, Model};

/// Root error type for identity management operations.
#[derive(Error, Debug)]
pub enum IdentityError {
    /// Reading one or more resources failed.
    #[error("{message}")]
    Read {
        message: String,
        #[source]
        cause: FailureCause,
    },

    /// Creating a resource failed.
    #[error("{message}")]
    Create {
        message: String,
        #[source]
        cause: FailureCause,
    },

    /// Updating, deleting or rotating a resource failed.
    #[error("{message}")]
    Update {
        message: String,
        #[source]
        cause: FailureCause,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Discriminant of [`IdentityError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Read,
    Create,
    Update,
    Configuration,
}

impl IdentityError {
    /// `Failed to read <resources>.`
    pub fn read_all<M: Model>(cause: impl Into<FailureCause>) -> Self {
        Self::Read {
            message: format!("Failed to read {}.", M::RESOURCE.plural),
            cause: cause.into(),
        }
    }

    /// `Failed to read <resource>: '<key>'.`
    pub fn read_one<M: Model>(key: &Key<M::KeyType>, cause: impl Into<FailureCause>) -> Self {
        Self::Read {
            message: format!("Failed to read {}: '{}'.", M::RESOURCE.singular, key),
            cause: cause.into(),
        }
    }

    /// `Failed to create <resource>.`
    pub fn create<M: Model>(cause: impl Into<FailureCause>) -> Self {
        Self::Create {
            message: format!("Failed to create {}.", M::RESOURCE.singular),
            cause: cause.into(),
        }
    }

    /// `Failed to update <resource>: '<key>'.`
    pub fn update<M: Model>(key: &Key<M::KeyType>, cause: impl Into<FailureCause>) -> Self {
        Self::Update {
            message: format!("Failed to update {}: '{}'.", M::RESOURCE.singular, key),
            cause: cause.into(),
        }
    }

    /// `Failed to delete <resource>: '<key>'.`
    pub fn delete<M: Model>(key: &Key<M::KeyType>, cause: impl Into<FailureCause>) -> Self {
        Self::Update {
            message: format!("Failed to delete {}: '{}'.", M::RESOURCE.singular, key),
            cause: cause.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { .. } => ErrorKind::Read,
            Self::Create { .. } => ErrorKind::Create,
            Self::Update { .. } => ErrorKind::Update,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Get the operation message (without the cause).
    pub fn message(&self) -> String {
        match self {
            Self::Read { message, .. }
            | Self::Create { message, .. }
            | Self::Update { message, .. } => message.clone(),
            Self::Configuration(e) => e.to_string(),
        }
    }

    /// Get the wrapped cause, if this is an operation error.
    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            Self::Read { cause, .. } | Self::Create { cause, .. } | Self::Update { cause, .. } => {
                Some(cause)
            }
            Self::Configuration(_) => None,
        }
    }

    /// Whether the operation gave up because the provider kept rate limiting it.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self.cause(),
            Some(FailureCause::Remote(RemoteError::RateLimited { .. }))
        )
    }

    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Read { cause, .. } | Self::Create { cause, .. } | Self::Update { cause, .. } => {
                cause.error_code()
            }
            Self::Configuration(_) => "IDENTITY_CONFIG",
        }
    }
}

/// Underlying reason an operation failed.
#[derive(Error, Debug)]
pub enum FailureCause {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Page size must be greater than zero")]
    InvalidPageSize,
}

impl FailureCause {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Remote(RemoteError::RateLimited { .. }) => "IDENTITY_RATE_LIMITED",
            Self::Remote(_) => "IDENTITY_REMOTE",
            Self::Mapping(_) => "IDENTITY_MAPPING",
            Self::Filter(_) => "IDENTITY_FILTER",
            Self::Credential(_) => "IDENTITY_CREDENTIAL",
            Self::Storage(_) => "IDENTITY_STORAGE",
            Self::InvalidPageSize => "IDENTITY_PAGING",
        }
    }
}

/// Failure reported by the remote management API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Rate limited by identity provider")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Identity provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request to identity provider failed: {message}")]
    Transport { message: String },

    #[error("Invalid response from identity provider: {message}")]
    InvalidResponse { message: String },
}

impl RemoteError {
    /// Check if this is the rate-limit signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// HTTP status, when the provider answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Domain/wire mapping error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("{mapper} does not implement {interface} for destination type {destination}")]
    UnsupportedDestination {
        interface: &'static str,
        mapper: &'static str,
        destination: &'static str,
    },

    #[error("Missing required field '{field}' when mapping {type_name}")]
    MissingField {
        field: &'static str,
        type_name: &'static str,
    },

    #[error("Invalid key '{value}': {message}")]
    InvalidKey { value: String, message: String },
}

impl MappingError {
    /// Error for a mapper that cannot produce `D`.
    pub fn unsupported<S: ?Sized, D: ?Sized>(interface: &'static str) -> Self {
        Self::UnsupportedDestination {
            interface,
            mapper: std::any::type_name::<S>(),
            destination: std::any::type_name::<D>(),
        }
    }

    pub fn missing_field<T: ?Sized>(field: &'static str) -> Self {
        Self::MissingField {
            field,
            type_name: std::any::type_name::<T>(),
        }
    }
}

/// Filter construction error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Filter {filter} cannot build a {destination}")]
    UnsupportedDestination {
        filter: &'static str,
        destination: &'static str,
    },

    #[error("Invalid filter: {message}")]
    Invalid { message: String },
}

impl FilterError {
    pub fn unsupported<F: ?Sized>(destination: &'static str) -> Self {
        Self::UnsupportedDestination {
            filter: std::any::type_name::<F>(),
            destination,
        }
    }
}

/// Access token acquisition error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error(
        "Token request failed{}: {message}",
        status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
    )]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid token response: {message}")]
    InvalidResponse { message: String },
}

/// In-memory storage error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Key not found: '{key}'")]
    KeyNotFound { key: String },

    #[error("Duplicate key: '{key}'")]
    DuplicateKey { key: String },
}

impl StorageError {
    pub fn key_not_found<K: KeyValue>(key: &Key<K>) -> Self {
        Self::KeyNotFound {
            key: key.to_string(),
        }
    }

    pub fn duplicate_key<K: KeyValue>(key: &Key<K>) -> Self {
        Self::DuplicateKey {
            key: key.to_string(),
        }
    }
}

/// Configuration error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error("Invalid endpoint URL: {url}")]
    InvalidEndpoint { url: String },
}

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Grant, User};
    use std::error::Error as _;

    #[test]
    fn test_read_messages() {
        let all = IdentityError::read_all::<User>(FailureCause::InvalidPageSize);
        assert_eq!(all.to_string(), "Failed to read users.");

        let one = IdentityError::read_one::<User>(
            &Key::from("auth0|42"),
            StorageError::KeyNotFound {
                key: "auth0|42".into(),
            },
        );
        assert_eq!(one.to_string(), "Failed to read user: 'auth0|42'.");
        assert_eq!(one.kind(), ErrorKind::Read);
    }

    #[test]
    fn test_update_and_delete_share_kind() {
        let key = Key::from("cgr_1");
        let update = IdentityError::update::<Grant>(&key, RemoteError::Transport {
            message: "reset".into(),
        });
        let delete = IdentityError::delete::<Grant>(&key, RemoteError::Transport {
            message: "reset".into(),
        });

        assert_eq!(update.to_string(), "Failed to update grant: 'cgr_1'.");
        assert_eq!(delete.to_string(), "Failed to delete grant: 'cgr_1'.");
        assert_eq!(update.kind(), ErrorKind::Update);
        assert_eq!(delete.kind(), ErrorKind::Update);
    }

    #[test]
    fn test_cause_is_source() {
        let error = IdentityError::create::<User>(RemoteError::Api {
            status: 409,
            message: "The user already exists.".into(),
        });

        let source = error.source().map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("Identity provider returned HTTP 409: The user already exists.")
        );
        assert_eq!(error.error_code(), "IDENTITY_REMOTE");
    }

    #[test]
    fn test_rate_limited_detection() {
        let error =
            IdentityError::read_all::<Grant>(RemoteError::RateLimited { retry_after: None });
        assert!(error.is_rate_limited());
        assert_eq!(error.error_code(), "IDENTITY_RATE_LIMITED");

        let error = IdentityError::read_all::<Grant>(FailureCause::InvalidPageSize);
        assert!(!error.is_rate_limited());
    }

    #[test]
    fn test_unsupported_destination_names_types() {
        struct ReadOnlyMapper;
        let error =
            MappingError::unsupported::<ReadOnlyMapper, String>("Mapper::to_create_request");
        let message = error.to_string();

        assert!(message.contains("ReadOnlyMapper"));
        assert!(message.contains("Mapper::to_create_request"));
        assert!(message.contains("String"));
    }

    #[test]
    fn test_credential_error_display() {
        let error = CredentialError::RequestFailed {
            status: Some(401),
            message: "access_denied".into(),
        };
        assert_eq!(error.to_string(), "Token request failed (HTTP 401): access_denied");

        let error = CredentialError::RequestFailed {
            status: None,
            message: "connection refused".into(),
        };
        assert_eq!(error.to_string(), "Token request failed: connection refused");
    }
}
