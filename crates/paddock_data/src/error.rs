//! # Data Error Types
//!
//! All errors that can occur between a Record and the backing store.

use thiserror::Error;

/// Errors that can occur in the data layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// A Record was used after its entity was never found or was evicted.
    #[error("{kind} '{key}' is not available")]
    Unavailable {
        /// Entity kind.
        kind: &'static str,
        /// Entity key.
        key: String,
    },

    /// The backing store has no entity with this key.
    #[error("{kind} '{key}' not found in the backing store")]
    NotFound {
        /// Entity kind.
        kind: &'static str,
        /// Entity key.
        key: String,
    },

    /// An entity with this key is already resident.
    #[error("{kind} '{key}' already exists")]
    AlreadyExists {
        /// Entity kind.
        kind: &'static str,
        /// Entity key.
        key: String,
    },

    /// The uid counter of a kind ran out.
    #[error("uid space of {0} exhausted")]
    UidExhausted(&'static str),

    /// The backing store failed (I/O, lock, unreachable).
    #[error("backing store failure: {0}")]
    Backend(String),

    /// A stored value could not be (de)serialized.
    #[error("serialization failure: {0}")]
    Serialization(String),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A load attempt can never succeed.
    #[error("loading data of user '{user}' failed: {reason}")]
    LoadFailed {
        /// User whose data was being loaded.
        user: String,
        /// Last recorded failure.
        reason: String,
    },
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for data operations.
pub type DataResult<T> = Result<T, DataError>;
