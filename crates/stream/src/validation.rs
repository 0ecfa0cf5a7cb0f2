//! Envelope validation.
//!
//! Structural validation checks that every required field is present and
//! non-empty. The encryption check is semantic and only runs when enabled.

use thiserror::Error;
use tracing::debug;

use crate::config::ValidatorConfig;
use crate::error::Result;
use crate::message::{Message, WebhookMessage};
use crate::properties::MessageProperties;

const MESSAGE_PROPERTIES_PATH: &str = "Message.properties";
const WEBHOOK_PROPERTIES_PATH: &str = "WebhookMessage.properties";

/// A validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{path}.{field}: required field is missing or empty")]
    Required {
        /// Path of the struct holding the field.
        path: &'static str,

        /// Field name as it appears on the wire.
        field: &'static str,
    },

    /// Encryption is set but no key identifier accompanies it.
    #[error("encryption key id is required when encryption is enabled")]
    EncryptionKeyIdRequired,
}

/// Validates message envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageValidator {
    check_encryption: bool,
}

impl MessageValidator {
    /// A validator running structural checks only.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            check_encryption: false,
        }
    }

    /// A validator configured from `config`.
    #[must_use]
    pub const fn from_config(config: &ValidatorConfig) -> Self {
        Self {
            check_encryption: config.require_encryption_key_id,
        }
    }

    /// Also require an encryption key id whenever encryption is set.
    #[must_use]
    pub const fn with_encryption_check(mut self) -> Self {
        self.check_encryption = true;
        self
    }

    /// Validate a message and its properties.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) naming the
    /// first missing field, or the failed encryption check.
    pub fn validate(&self, message: &Message) -> Result<()> {
        self.check_properties(MESSAGE_PROPERTIES_PATH, &message.properties)?;
        if !message.has_payload() {
            return Err(rejected("Message", "payload").into());
        }
        Ok(())
    }

    /// Validate a standalone property set.
    ///
    /// # Errors
    ///
    /// Same as [`Self::validate`], without the payload check.
    pub fn validate_properties(&self, properties: &MessageProperties) -> Result<()> {
        self.check_properties("MessageProperties", properties)
            .map_err(crate::Error::Validation)
    }

    /// Validate a webhook message. All five webhook properties are required.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) naming the
    /// first missing field.
    pub fn validate_webhook(&self, message: &WebhookMessage) -> Result<()> {
        let props = &message.properties;
        require(WEBHOOK_PROPERTIES_PATH, "workspaceID", &props.workspace_id)?;
        require(WEBHOOK_PROPERTIES_PATH, "sourceID", &props.source_id)?;
        require(WEBHOOK_PROPERTIES_PATH, "sourceType", &props.source_type)?;
        require(WEBHOOK_PROPERTIES_PATH, "reason", &props.reason)?;
        require(WEBHOOK_PROPERTIES_PATH, "stage", &props.stage)?;

        if !message.has_payload() {
            return Err(rejected("WebhookMessage", "payload").into());
        }
        Ok(())
    }

    fn check_properties(&self, path: &'static str, props: &MessageProperties) -> Result<(), ValidationError> {
        require(path, "requestType", &props.request_type)?;
        require(path, "routingKey", &props.routing_key)?;
        require(path, "workspaceID", &props.workspace_id)?;
        require(path, "sourceID", &props.source_id)?;
        require(path, "requestIP", &props.request_ip)?;

        if self.check_encryption && !props.encryption.is_empty() && props.encryption_key_id.is_empty() {
            debug!(
                workspace_id = %props.workspace_id,
                source_id = %props.source_id,
                "rejecting encrypted properties without a key id"
            );
            return Err(ValidationError::EncryptionKeyIdRequired);
        }

        Ok(())
    }
}

fn require(path: &'static str, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(rejected(path, field));
    }
    Ok(())
}

fn rejected(path: &'static str, field: &'static str) -> ValidationError {
    debug!(path, field, "required field is missing or empty");
    ValidationError::Required { path, field }
}
