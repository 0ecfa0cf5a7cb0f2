//! Validator configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for [`MessageValidator`](crate::MessageValidator).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Reject properties that set `encryption` without `encryptionKeyID`.
    pub require_encryption_key_id: bool,
}

impl ValidatorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `json` is not a valid configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Config)
    }
}
