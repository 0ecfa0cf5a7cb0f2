//! Message envelopes: properties plus an opaque JSON payload.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{Error, Result};
use crate::properties::MessageProperties;
use crate::webhook::WebhookProperties;

/// A message exchanged between gateway, router and processors.
///
/// The payload is kept as raw JSON and re-emitted byte for byte.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Routing and lineage properties.
    pub properties: MessageProperties,

    /// Opaque payload.
    pub payload: Box<RawValue>,
}

/// A message emitted by the webhook stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookMessage {
    /// Webhook routing properties.
    pub properties: WebhookProperties,

    /// Opaque payload.
    pub payload: Box<RawValue>,
}

macro_rules! impl_envelope {
    ($ty:ident, $props:ty) => {
        impl $ty {
            /// Create an envelope around an already-encoded payload.
            #[must_use]
            pub const fn new(properties: $props, payload: Box<RawValue>) -> Self {
                Self { properties, payload }
            }

            /// Create an envelope, encoding `payload` as JSON.
            ///
            /// # Errors
            ///
            /// Returns [`Error::Encode`] if `payload` cannot be serialized.
            pub fn from_json_payload<T>(properties: $props, payload: &T) -> Result<Self>
            where
                T: Serialize + ?Sized,
            {
                let payload = serde_json::value::to_raw_value(payload).map_err(|source| Error::Encode {
                    type_name: concat!(stringify!($ty), ".payload"),
                    source,
                })?;

                Ok(Self::new(properties, payload))
            }

            /// Raw JSON text of the payload.
            #[must_use]
            pub fn payload_json(&self) -> &str {
                self.payload.get()
            }

            pub(crate) fn has_payload(&self) -> bool {
                let raw = self.payload.get().trim();
                !raw.is_empty() && raw != "null"
            }
        }

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.properties == other.properties && self.payload.get() == other.payload.get()
            }
        }

        impl TryFrom<Bytes> for $ty {
            type Error = Error;

            fn try_from(bytes: Bytes) -> std::result::Result<Self, Self::Error> {
                serde_json::from_slice(bytes.as_ref()).map_err(|source| Error::Decode {
                    type_name: stringify!($ty),
                    source,
                })
            }
        }

        impl TryInto<Bytes> for $ty {
            type Error = Error;

            fn try_into(self) -> std::result::Result<Bytes, Self::Error> {
                serde_json::to_vec(&self)
                    .map(Bytes::from)
                    .map_err(|source| Error::Encode {
                        type_name: stringify!($ty),
                        source,
                    })
            }
        }
    };
}

impl_envelope!(Message, MessageProperties);
impl_envelope!(WebhookMessage, WebhookProperties);
