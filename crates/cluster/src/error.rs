//! Error types for the migration protocol model.

use thiserror::Error;

/// Result type for migration protocol operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A record could not be decoded from its wire form.
    #[error("failed to decode {type_name}: {source}")]
    Decode {
        /// Name of the type being decoded.
        type_name: &'static str,

        /// Underlying JSON error, naming the offending field when one is missing.
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded to its wire form.
    #[error("failed to encode {type_name}: {source}")]
    Encode {
        /// Name of the type being encoded.
        type_name: &'static str,

        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A migration or job header violates a structural invariant.
    #[error("invalid migration {migration_id:?}: {reason}")]
    InvalidMigration {
        /// Migration the offending record belongs to (empty when unknown).
        migration_id: String,

        /// What is wrong with it.
        reason: String,
    },

    /// A status string is not one of the known lifecycle values.
    #[error("unknown {kind} status: {value:?}")]
    UnknownStatus {
        /// Which status enum was being parsed.
        kind: &'static str,

        /// The rejected value.
        value: String,
    },
}

impl Error {
    pub(crate) fn invalid(migration_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMigration {
            migration_id: migration_id.into(),
            reason: reason.into(),
        }
    }
}
