//! Property map keys.
//!
//! These are the attribute names envelopes use on transports that only carry
//! flat string maps. The same names are used as JSON field names.

/// Stage marker that activates the webhook-only properties.
pub const STAGE_WEBHOOK: &str = "webhook";

pub const REQUEST_TYPE: &str = "requestType";
pub const ROUTING_KEY: &str = "routingKey";
pub const WORKSPACE_ID: &str = "workspaceID";
pub const SOURCE_ID: &str = "sourceID";
pub const DESTINATION_ID: &str = "destinationID";
pub const REQUEST_IP: &str = "requestIP";
pub const RECEIVED_AT: &str = "receivedAt";
pub const USER_ID: &str = "userID";
pub const SOURCE_JOB_RUN_ID: &str = "sourceJobRunID";
pub const SOURCE_TASK_RUN_ID: &str = "sourceTaskRunID";
pub const TRACE_ID: &str = "traceID";
pub const COMPRESSION: &str = "compression";
pub const ENCRYPTION: &str = "encryption";
pub const ENCRYPTION_KEY_ID: &str = "encryptionKeyID";

// Present only when the stage is `webhook`.
pub const SOURCE_TYPE: &str = "sourceType";
pub const WEBHOOK_FAILURE_REASON: &str = "webhookFailureReason";
pub const STAGE: &str = "stage";

// Present only when `isBot` is true.
pub const IS_BOT: &str = "isBot";
pub const BOT_NAME: &str = "botName";
pub const BOT_URL: &str = "botURL";
pub const BOT_IS_INVALID_BROWSER: &str = "botIsInvalidBrowser";
pub const NEEDS_BOT_ENRICHMENT: &str = "needsBotEnrichment";

/// Failure reason key of webhook property sets.
pub const REASON: &str = "reason";
