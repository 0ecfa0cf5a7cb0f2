//! Routing and lineage properties of a pipeline message.
//!
//! Optional string properties use the empty string for "unset": transports
//! that carry properties as flat string maps cannot tell an absent attribute
//! from an empty one, so the structured form does not pretend to either.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::field::Empty;
use tracing::{Span, trace};

use crate::error::{Error, Result};
use crate::keys;
use crate::timestamp::{self, Timestamp};

/// Flat string-keyed form of a property set.
pub type PropertyMap = HashMap<String, String>;

/// Properties of a message travelling between gateway, router and processors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageProperties {
    /// Kind of request that produced the message.
    pub request_type: String,

    /// Key the broker partitions by.
    pub routing_key: String,

    /// Workspace the message belongs to.
    #[serde(rename = "workspaceID")]
    pub workspace_id: String,

    /// Source the message was received from.
    #[serde(rename = "sourceID")]
    pub source_id: String,

    /// When the gateway received the message.
    #[serde(with = "timestamp::rfc3339_nano")]
    pub received_at: Timestamp,

    /// Address of the client that sent the request.
    #[serde(rename = "requestIP")]
    pub request_ip: String,

    /// Destination the message is bound for, if already known.
    #[serde(rename = "destinationID", default, skip_serializing_if = "String::is_empty")]
    pub destination_id: String,

    /// End user the event is about.
    #[serde(rename = "userID", default, skip_serializing_if = "String::is_empty")]
    pub user_id: String,

    /// Job run that produced the message, for batch sources.
    #[serde(rename = "sourceJobRunID", default, skip_serializing_if = "String::is_empty")]
    pub source_job_run_id: String,

    /// Task run that produced the message, for batch sources.
    #[serde(rename = "sourceTaskRunID", default, skip_serializing_if = "String::is_empty")]
    pub source_task_run_id: String,

    /// Distributed trace the message belongs to.
    #[serde(rename = "traceID", default, skip_serializing_if = "String::is_empty")]
    pub trace_id: String,

    /// Only carried on flat maps when `stage` is `webhook`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_type: String,

    /// Only carried on flat maps when `stage` is `webhook`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub webhook_failure_reason: String,

    /// Pipeline stage marker. `webhook` is the only value with side effects.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stage: String,

    /// Serialized compression settings of the payload.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub compression: String,

    /// Serialized encryption settings of the payload.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub encryption: String,

    /// Identifies the key the payload was encrypted with, so rotated keys
    /// can still be resolved.
    #[serde(rename = "encryptionKeyID", default, skip_serializing_if = "String::is_empty")]
    pub encryption_key_id: String,

    /// Whether the event was sent by a bot. Gates every `bot*` property.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_bot: bool,

    /// Name of the bot that sent the event.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bot_name: String,

    /// Reference explaining why the user agent was identified as a bot.
    #[serde(rename = "botURL", default, skip_serializing_if = "String::is_empty")]
    pub bot_url: String,

    /// The event is from a bot and the browser is invalid.
    #[serde(default, skip_serializing_if = "is_false")]
    pub bot_is_invalid_browser: bool,

    /// The event should be enriched with bot details.
    #[serde(default, skip_serializing_if = "is_false")]
    pub needs_bot_enrichment: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// A single structured logging field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogField {
    /// Field name.
    pub key: &'static str,

    /// Field value.
    pub value: LogValue,
}

/// Value of a [`LogField`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogValue {
    /// A string value.
    Str(String),

    /// A boolean value.
    Bool(bool),
}

impl LogField {
    /// A string field.
    #[must_use]
    pub fn string(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: LogValue::Str(value.into()),
        }
    }

    /// A boolean field.
    #[must_use]
    pub const fn bool(key: &'static str, value: bool) -> Self {
        Self {
            key,
            value: LogValue::Bool(value),
        }
    }
}

impl MessageProperties {
    /// Create properties from the required fields, leaving every optional one unset.
    #[must_use]
    pub fn new(
        request_type: impl Into<String>,
        routing_key: impl Into<String>,
        workspace_id: impl Into<String>,
        source_id: impl Into<String>,
        received_at: Timestamp,
        request_ip: impl Into<String>,
    ) -> Self {
        Self {
            request_type: request_type.into(),
            routing_key: routing_key.into(),
            workspace_id: workspace_id.into(),
            source_id: source_id.into(),
            received_at,
            request_ip: request_ip.into(),
            destination_id: String::new(),
            user_id: String::new(),
            source_job_run_id: String::new(),
            source_task_run_id: String::new(),
            trace_id: String::new(),
            source_type: String::new(),
            webhook_failure_reason: String::new(),
            stage: String::new(),
            compression: String::new(),
            encryption: String::new(),
            encryption_key_id: String::new(),
            is_bot: false,
            bot_name: String::new(),
            bot_url: String::new(),
            bot_is_invalid_browser: false,
            needs_bot_enrichment: false,
        }
    }

    /// Whether the webhook-only properties are active.
    #[must_use]
    pub fn is_webhook_stage(&self) -> bool {
        self.stage == keys::STAGE_WEBHOOK
    }

    /// Convert to the flat map carried as transport attributes.
    ///
    /// Base keys are always present, even when empty. The webhook keys are
    /// added only in the webhook stage, and the bot keys only for bots.
    #[must_use]
    pub fn to_flat_map(&self) -> PropertyMap {
        let mut map = PropertyMap::with_capacity(22);
        let mut put = |key: &str, value: &str| {
            map.insert(key.to_string(), value.to_string());
        };

        put(keys::REQUEST_TYPE, &self.request_type);
        put(keys::ROUTING_KEY, &self.routing_key);
        put(keys::WORKSPACE_ID, &self.workspace_id);
        put(keys::USER_ID, &self.user_id);
        put(keys::SOURCE_ID, &self.source_id);
        put(keys::DESTINATION_ID, &self.destination_id);
        put(keys::REQUEST_IP, &self.request_ip);
        put(keys::RECEIVED_AT, &timestamp::format(&self.received_at));
        put(keys::SOURCE_JOB_RUN_ID, &self.source_job_run_id);
        put(keys::SOURCE_TASK_RUN_ID, &self.source_task_run_id);
        put(keys::TRACE_ID, &self.trace_id);
        put(keys::COMPRESSION, &self.compression);
        put(keys::ENCRYPTION, &self.encryption);
        put(keys::ENCRYPTION_KEY_ID, &self.encryption_key_id);

        if self.is_webhook_stage() {
            put(keys::SOURCE_TYPE, &self.source_type);
            put(keys::WEBHOOK_FAILURE_REASON, &self.webhook_failure_reason);
            put(keys::STAGE, &self.stage);
        }

        if self.is_bot {
            put(keys::IS_BOT, "true");
            put(keys::BOT_NAME, &self.bot_name);
            put(keys::BOT_URL, &self.bot_url);
            put(keys::BOT_IS_INVALID_BROWSER, bool_token(self.bot_is_invalid_browser));
            put(keys::NEEDS_BOT_ENRICHMENT, bool_token(self.needs_bot_enrichment));
        }

        map
    }

    /// Build properties from a flat attribute map.
    ///
    /// Missing keys read as empty. Webhook keys are read only when the map's
    /// stage is `webhook`; bot keys only when `isBot` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReceivedAt`] if `receivedAt` is missing or not
    /// RFC 3339, and [`Error::InvalidBool`] if a flag is neither `true` nor
    /// `false`.
    pub fn from_flat_map(map: &PropertyMap) -> Result<Self> {
        let get = |key: &str| map.get(key).cloned().unwrap_or_default();

        let raw_received_at = map.get(keys::RECEIVED_AT).map_or("", String::as_str);
        let received_at =
            timestamp::parse(raw_received_at).map_err(|source| Error::InvalidReceivedAt {
                value: raw_received_at.to_string(),
                source,
            })?;

        let mut properties = Self::new(
            get(keys::REQUEST_TYPE),
            get(keys::ROUTING_KEY),
            get(keys::WORKSPACE_ID),
            get(keys::SOURCE_ID),
            received_at,
            get(keys::REQUEST_IP),
        );
        properties.destination_id = get(keys::DESTINATION_ID);
        properties.user_id = get(keys::USER_ID);
        properties.source_job_run_id = get(keys::SOURCE_JOB_RUN_ID);
        properties.source_task_run_id = get(keys::SOURCE_TASK_RUN_ID);
        properties.trace_id = get(keys::TRACE_ID);
        properties.compression = get(keys::COMPRESSION);
        properties.encryption = get(keys::ENCRYPTION);
        properties.encryption_key_id = get(keys::ENCRYPTION_KEY_ID);
        properties.stage = get(keys::STAGE);

        if properties.is_webhook_stage() {
            properties.source_type = get(keys::SOURCE_TYPE);
            properties.webhook_failure_reason = get(keys::WEBHOOK_FAILURE_REASON);
        } else if map.contains_key(keys::SOURCE_TYPE) || map.contains_key(keys::WEBHOOK_FAILURE_REASON) {
            trace!(stage = %properties.stage, "ignoring webhook properties outside the webhook stage");
        }

        properties.is_bot = parse_flag(map, keys::IS_BOT)?;
        if properties.is_bot {
            properties.bot_name = get(keys::BOT_NAME);
            properties.bot_url = get(keys::BOT_URL);
            properties.bot_is_invalid_browser = parse_flag(map, keys::BOT_IS_INVALID_BROWSER)?;
            properties.needs_bot_enrichment = parse_flag(map, keys::NEEDS_BOT_ENRICHMENT)?;
        } else if map.contains_key(keys::BOT_NAME) || map.contains_key(keys::BOT_URL) {
            trace!("ignoring bot properties of a non-bot message");
        }

        Ok(properties)
    }

    /// Structured logging fields describing these properties.
    ///
    /// Webhook and bot fields follow the same gating as [`Self::to_flat_map`];
    /// `isBot` itself is always present.
    #[must_use]
    pub fn log_fields(&self) -> Vec<LogField> {
        let mut fields = Vec::with_capacity(22);

        if self.is_webhook_stage() {
            fields.push(LogField::string(keys::SOURCE_TYPE, &self.source_type));
            fields.push(LogField::string(keys::WEBHOOK_FAILURE_REASON, &self.webhook_failure_reason));
            fields.push(LogField::string(keys::STAGE, &self.stage));
        }

        fields.extend([
            LogField::string(keys::REQUEST_TYPE, &self.request_type),
            LogField::string(keys::ROUTING_KEY, &self.routing_key),
            LogField::string(keys::WORKSPACE_ID, &self.workspace_id),
            LogField::string(keys::USER_ID, &self.user_id),
            LogField::string(keys::SOURCE_ID, &self.source_id),
            LogField::string(keys::DESTINATION_ID, &self.destination_id),
            LogField::string(keys::REQUEST_IP, &self.request_ip),
            LogField::string(keys::RECEIVED_AT, timestamp::format(&self.received_at)),
            LogField::string(keys::SOURCE_JOB_RUN_ID, &self.source_job_run_id),
            LogField::string(keys::SOURCE_TASK_RUN_ID, &self.source_task_run_id),
            LogField::string(keys::TRACE_ID, &self.trace_id),
            LogField::string(keys::COMPRESSION, &self.compression),
            LogField::string(keys::ENCRYPTION, &self.encryption),
            LogField::string(keys::ENCRYPTION_KEY_ID, &self.encryption_key_id),
            LogField::bool(keys::IS_BOT, self.is_bot),
        ]);

        if self.is_bot {
            fields.extend([
                LogField::string(keys::BOT_NAME, &self.bot_name),
                LogField::string(keys::BOT_URL, &self.bot_url),
                LogField::bool(keys::BOT_IS_INVALID_BROWSER, self.bot_is_invalid_browser),
                LogField::bool(keys::NEEDS_BOT_ENRICHMENT, self.needs_bot_enrichment),
            ]);
        }

        fields
    }

    /// A span carrying the same fields as [`Self::log_fields`].
    #[must_use]
    pub fn span(&self) -> Span {
        let span = tracing::info_span!(
            "message",
            requestType = %self.request_type,
            routingKey = %self.routing_key,
            workspaceID = %self.workspace_id,
            userID = %self.user_id,
            sourceID = %self.source_id,
            destinationID = %self.destination_id,
            requestIP = %self.request_ip,
            receivedAt = %timestamp::format(&self.received_at),
            sourceJobRunID = %self.source_job_run_id,
            sourceTaskRunID = %self.source_task_run_id,
            traceID = %self.trace_id,
            compression = %self.compression,
            encryption = %self.encryption,
            encryptionKeyID = %self.encryption_key_id,
            isBot = self.is_bot,
            sourceType = Empty,
            webhookFailureReason = Empty,
            stage = Empty,
            botName = Empty,
            botURL = Empty,
            botIsInvalidBrowser = Empty,
            needsBotEnrichment = Empty,
        );

        if self.is_webhook_stage() {
            span.record(keys::SOURCE_TYPE, self.source_type.as_str());
            span.record(keys::WEBHOOK_FAILURE_REASON, self.webhook_failure_reason.as_str());
            span.record(keys::STAGE, self.stage.as_str());
        }

        if self.is_bot {
            span.record(keys::BOT_NAME, self.bot_name.as_str());
            span.record(keys::BOT_URL, self.bot_url.as_str());
            span.record(keys::BOT_IS_INVALID_BROWSER, self.bot_is_invalid_browser);
            span.record(keys::NEEDS_BOT_ENRICHMENT, self.needs_bot_enrichment);
        }

        span
    }
}

const fn bool_token(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn parse_flag(map: &PropertyMap, key: &'static str) -> Result<bool> {
    match map.get(key).map(String::as_str) {
        None | Some("" | "false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(Error::InvalidBool {
            key,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use tracing_test::traced_test;

    use crate::timestamp::ParseTimestampError;

    fn received_at() -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 8, 1)
            .and_then(|d| d.and_hms_nano_opt(2, 30, 50, 200))
            .unwrap()
            .and_utc()
            .fixed_offset()
    }

    fn properties() -> MessageProperties {
        MessageProperties {
            destination_id: "destinationID".to_string(),
            user_id: "userID".to_string(),
            trace_id: "traceID".to_string(),
            ..MessageProperties::new(
                "requestType",
                "routingKey",
                "workspaceID",
                "sourceID",
                received_at(),
                "10.29.13.20",
            )
        }
    }

    fn bot() -> MessageProperties {
        MessageProperties {
            is_bot: true,
            bot_name: "crawler".to_string(),
            bot_url: "https://bots.example/crawler".to_string(),
            bot_is_invalid_browser: false,
            needs_bot_enrichment: true,
            ..properties()
        }
    }

    #[test]
    fn test_bot_keys_emitted_for_bots() {
        let map = bot().to_flat_map();
        assert_eq!(map[keys::IS_BOT], "true");
        assert_eq!(map[keys::BOT_NAME], "crawler");
        assert_eq!(map[keys::BOT_URL], "https://bots.example/crawler");
        assert_eq!(map[keys::BOT_IS_INVALID_BROWSER], "false");
        assert_eq!(map[keys::NEEDS_BOT_ENRICHMENT], "true");

        assert_eq!(MessageProperties::from_flat_map(&map).unwrap(), bot());
    }

    #[test]
    fn test_bot_keys_omitted_for_non_bots() {
        let mut props = bot();
        props.is_bot = false;
        let map = props.to_flat_map();

        for key in [
            keys::IS_BOT,
            keys::BOT_NAME,
            keys::BOT_URL,
            keys::BOT_IS_INVALID_BROWSER,
            keys::NEEDS_BOT_ENRICHMENT,
        ] {
            assert!(!map.contains_key(key), "{key} should be absent");
        }
    }

    #[test]
    fn test_bot_keys_ignored_without_is_bot() {
        let mut map = properties().to_flat_map();
        map.insert(keys::BOT_NAME.to_string(), "crawler".to_string());
        map.insert(keys::NEEDS_BOT_ENRICHMENT.to_string(), "not-a-bool".to_string());

        let props = MessageProperties::from_flat_map(&map).unwrap();
        assert!(!props.is_bot);
        assert!(props.bot_name.is_empty());
        assert!(!props.needs_bot_enrichment);
    }

    #[test]
    fn test_invalid_bool_tokens() {
        let mut map = properties().to_flat_map();
        map.insert(keys::IS_BOT.to_string(), "yes".to_string());
        assert_matches!(
            MessageProperties::from_flat_map(&map),
            Err(Error::InvalidBool { key: "isBot", value }) if value == "yes"
        );

        let mut map = bot().to_flat_map();
        map.insert(keys::BOT_IS_INVALID_BROWSER.to_string(), "TRUE!".to_string());
        assert_matches!(
            MessageProperties::from_flat_map(&map),
            Err(Error::InvalidBool { key: "botIsInvalidBrowser", .. })
        );
    }

    #[test]
    fn test_missing_received_at() {
        let mut map = properties().to_flat_map();
        map.remove(keys::RECEIVED_AT);
        assert_matches!(
            MessageProperties::from_flat_map(&map),
            Err(Error::InvalidReceivedAt { value, .. }) if value.is_empty()
        );
    }

    #[test]
    fn test_received_at_outside_layout_is_rejected() {
        for (text, expected) in [
            ("2016-12-31T23:59:60.5Z", ParseTimestampError::LeapSecond),
            ("2024-08-01 02:30:50Z", ParseTimestampError::Separator),
            ("2024-08-01t02:30:50Z", ParseTimestampError::Separator),
            ("2024-08-01T02:30:50z", ParseTimestampError::LowercaseZulu),
        ] {
            let mut map = properties().to_flat_map();
            map.insert(keys::RECEIVED_AT.to_string(), text.to_string());

            assert_matches!(
                MessageProperties::from_flat_map(&map),
                Err(Error::InvalidReceivedAt { value, source }) if value == text && source == expected
            );
        }
    }

    #[test]
    fn test_webhook_keys_ignored_outside_webhook_stage() {
        let mut map = properties().to_flat_map();
        map.insert(keys::SOURCE_TYPE.to_string(), "sourceType".to_string());

        let props = MessageProperties::from_flat_map(&map).unwrap();
        assert!(props.source_type.is_empty());
    }

    #[test]
    fn test_log_fields_gating() {
        let fields = properties().log_fields();
        let keys: Vec<_> = fields.iter().map(|f| f.key).collect();
        assert!(keys.contains(&keys::IS_BOT));
        assert!(!keys.contains(&keys::STAGE));
        assert!(!keys.contains(&keys::BOT_NAME));
        assert_eq!(fields.len(), 15);

        let fields = bot().log_fields();
        assert!(fields.contains(&LogField::bool(keys::NEEDS_BOT_ENRICHMENT, true)));
        assert_eq!(fields.len(), 19);
    }

    #[test]
    fn test_log_fields_received_at_format() {
        assert!(
            properties()
                .log_fields()
                .contains(&LogField::string(keys::RECEIVED_AT, "2024-08-01T02:30:50.0000002Z"))
        );
    }

    #[test]
    #[traced_test]
    fn test_span_records_fields() {
        let props = MessageProperties {
            stage: keys::STAGE_WEBHOOK.to_string(),
            source_type: "webhook-source".to_string(),
            ..bot()
        };

        let _entered = props.span().entered();
        tracing::info!("handling message");

        assert!(logs_contain("workspaceID=workspaceID"));
        assert!(logs_contain("sourceType=webhook-source"));
        assert!(logs_contain("botName=crawler"));
        assert!(logs_contain("isBot=true"));
    }

    #[test]
    #[traced_test]
    fn test_span_leaves_gated_fields_empty() {
        let _entered = properties().span().entered();
        tracing::info!("handling message");

        assert!(logs_contain("isBot=false"));
        assert!(!logs_contain("botName="));
        assert!(!logs_contain("sourceType="));
    }
}
