//! Error types for message envelopes.

use thiserror::Error;

use crate::timestamp::ParseTimestampError;
use crate::validation::ValidationError;

/// Result type for envelope operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The `receivedAt` property is not an RFC 3339 timestamp in the envelope layout.
    #[error("parsing receivedAt {value:?}: {source}")]
    InvalidReceivedAt {
        /// The rejected value.
        value: String,

        /// Why it was rejected.
        #[source]
        source: ParseTimestampError,
    },

    /// A boolean property holds something other than `true` or `false`.
    #[error("parsing {key}: invalid boolean {value:?}")]
    InvalidBool {
        /// Property map key of the flag.
        key: &'static str,

        /// The rejected value.
        value: String,
    },

    /// An envelope could not be decoded from its wire form.
    #[error("failed to decode {type_name}: {source}")]
    Decode {
        /// Name of the type being decoded.
        type_name: &'static str,

        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An envelope could not be encoded to its wire form.
    #[error("failed to encode {type_name}: {source}")]
    Encode {
        /// Name of the type being encoded.
        type_name: &'static str,

        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Validator configuration could not be parsed.
    #[error("invalid validator config: {0}")]
    Config(#[source] serde_json::Error),

    /// An envelope failed a [`MessageValidator`](crate::MessageValidator) check.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
