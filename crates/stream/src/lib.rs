//! Message envelopes exchanged between gateway, router and processing stages.
//!
//! An envelope is a set of routing properties plus an opaque JSON payload.
//! Properties travel either as JSON or as a flat string map for transports
//! whose attribute systems only carry strings; both forms are lossless for
//! well-formed values.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::implicit_hasher)]

pub mod config;
pub mod error;
#[allow(missing_docs)]
pub mod keys;
pub mod message;
pub mod properties;
pub mod timestamp;
pub mod validation;
pub mod variant;
pub mod webhook;

pub use config::ValidatorConfig;
pub use error::{Error, Result};
pub use message::{Message, WebhookMessage};
pub use properties::{LogField, LogValue, MessageProperties, PropertyMap};
pub use timestamp::{ParseTimestampError, Timestamp};
pub use validation::{MessageValidator, ValidationError};
pub use variant::{Properties, PropertiesKind};
pub use webhook::WebhookProperties;
