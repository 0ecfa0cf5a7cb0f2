//! Closed set of property-set variants.

use std::fmt;

use crate::error::Result;
use crate::properties::{MessageProperties, PropertyMap};
use crate::webhook::WebhookProperties;

/// Discriminant of [`Properties`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertiesKind {
    /// [`MessageProperties`].
    Message,

    /// [`WebhookProperties`].
    Webhook,
}

impl fmt::Display for PropertiesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message => write!(f, "message"),
            Self::Webhook => write!(f, "webhook"),
        }
    }
}

/// A property set of any known kind.
///
/// A flat map does not say which kind it holds, so decoding takes the kind
/// explicitly rather than guessing from the keys present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Properties {
    /// Properties of a pipeline message.
    Message(MessageProperties),

    /// Properties of a webhook-stage message.
    Webhook(WebhookProperties),
}

impl Properties {
    /// The variant's discriminant.
    #[must_use]
    pub const fn kind(&self) -> PropertiesKind {
        match self {
            Self::Message(_) => PropertiesKind::Message,
            Self::Webhook(_) => PropertiesKind::Webhook,
        }
    }

    /// Convert the held property set to a flat map.
    #[must_use]
    pub fn to_flat_map(&self) -> PropertyMap {
        match self {
            Self::Message(props) => props.to_flat_map(),
            Self::Webhook(props) => props.to_flat_map(),
        }
    }

    /// Decode a flat map as the property set named by `kind`.
    ///
    /// # Errors
    ///
    /// Propagates [`MessageProperties::from_flat_map`] errors. Webhook
    /// properties always decode.
    pub fn from_flat_map(kind: PropertiesKind, map: &PropertyMap) -> Result<Self> {
        match kind {
            PropertiesKind::Message => MessageProperties::from_flat_map(map).map(Self::Message),
            PropertiesKind::Webhook => Ok(Self::Webhook(WebhookProperties::from_flat_map(map))),
        }
    }
}

impl From<MessageProperties> for Properties {
    fn from(props: MessageProperties) -> Self {
        Self::Message(props)
    }
}

impl From<WebhookProperties> for Properties {
    fn from(props: WebhookProperties) -> Self {
        Self::Webhook(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use crate::error::Error;
    use crate::keys;

    fn webhook_map() -> PropertyMap {
        WebhookProperties::new("ws", "src", "Stripe", "reason", "webhook").to_flat_map()
    }

    #[test]
    fn test_dispatch_on_explicit_kind() {
        let map = webhook_map();

        let props = Properties::from_flat_map(PropertiesKind::Webhook, &map).unwrap();
        assert_eq!(props.kind(), PropertiesKind::Webhook);
        assert_eq!(props.to_flat_map(), map);

        // The same map is not a valid message property set: it has no receivedAt.
        assert_matches!(
            Properties::from_flat_map(PropertiesKind::Message, &map),
            Err(Error::InvalidReceivedAt { .. })
        );
    }

    #[test]
    fn test_message_variant() {
        let mut map = webhook_map();
        map.insert(keys::RECEIVED_AT.to_string(), "2024-08-01T02:30:50Z".to_string());

        let props = Properties::from_flat_map(PropertiesKind::Message, &map).unwrap();
        assert_eq!(props.kind(), PropertiesKind::Message);
        assert_matches!(props, Properties::Message(p) if p.workspace_id == "ws" && p.source_type == "Stripe");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(PropertiesKind::Message.to_string(), "message");
        assert_eq!(PropertiesKind::Webhook.to_string(), "webhook");
    }
}
