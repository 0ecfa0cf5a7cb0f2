//! Properties of messages produced by the webhook transformation stage.

use serde::{Deserialize, Serialize};

use crate::keys;
use crate::properties::PropertyMap;

/// Routing properties of a webhook message.
///
/// All five fields are required by validation. The JSON form still omits
/// the last three when empty so a partially built value serializes cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookProperties {
    /// Workspace the webhook belongs to.
    #[serde(rename = "workspaceID")]
    pub workspace_id: String,

    /// Webhook source.
    #[serde(rename = "sourceID")]
    pub source_id: String,

    /// Source definition type.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_type: String,

    /// Why the webhook request was routed here.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    /// Pipeline stage marker.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stage: String,
}

impl WebhookProperties {
    /// Create webhook properties.
    #[must_use]
    pub fn new(
        workspace_id: impl Into<String>,
        source_id: impl Into<String>,
        source_type: impl Into<String>,
        reason: impl Into<String>,
        stage: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            source_id: source_id.into(),
            source_type: source_type.into(),
            reason: reason.into(),
            stage: stage.into(),
        }
    }

    /// Convert to a flat map. All five keys are always present.
    #[must_use]
    pub fn to_flat_map(&self) -> PropertyMap {
        [
            (keys::WORKSPACE_ID, &self.workspace_id),
            (keys::SOURCE_ID, &self.source_id),
            (keys::SOURCE_TYPE, &self.source_type),
            (keys::REASON, &self.reason),
            (keys::STAGE, &self.stage),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
    }

    /// Build from a flat map. Missing keys read as empty; this never fails.
    #[must_use]
    pub fn from_flat_map(map: &PropertyMap) -> Self {
        let get = |key: &str| map.get(key).cloned().unwrap_or_default();

        Self {
            workspace_id: get(keys::WORKSPACE_ID),
            source_id: get(keys::SOURCE_ID),
            source_type: get(keys::SOURCE_TYPE),
            reason: get(keys::REASON),
            stage: get(keys::STAGE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_map_round_trip() {
        let props = WebhookProperties::new("workspaceID", "sourceID", "Shopify", "transformer failed", "webhook");
        let map = props.to_flat_map();

        assert_eq!(map.len(), 5);
        assert_eq!(map[keys::REASON], "transformer failed");
        assert_eq!(WebhookProperties::from_flat_map(&map), props);
    }

    #[test]
    fn test_empty_fields_still_mapped() {
        let map = WebhookProperties::default().to_flat_map();
        assert_eq!(map.len(), 5);
        assert!(map.values().all(String::is_empty));
    }

    #[test]
    fn test_json_omits_empty_optional_fields() {
        let props = WebhookProperties::new("ws", "src", "", "", "");
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json, serde_json::json!({"workspaceID": "ws", "sourceID": "src"}));
    }
}
