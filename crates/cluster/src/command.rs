//! Reload commands issued during a migration, and the acks nodes send back.
//!
//! Each command carries its own ack key prefix. Commands derived from a
//! migration nest their prefix under the migration's, so acknowledgments for
//! different phases never share a key even when sent to the same nodes.

use serde::{Deserialize, Serialize};

use crate::ack_key::AckKeyed;
use crate::migration::NodeIndex;

/// Instructs gateway nodes to reload their partition routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadGatewayCommand {
    /// Indices of the gateway nodes to reload.
    pub nodes: Vec<NodeIndex>,

    /// Prefix for the ack keys of this command.
    #[serde(alias = "ackKey")]
    pub ack_key_prefix: String,
}

/// A gateway node's acknowledgment of a reload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadGatewayAck {
    /// Index of the acknowledging node.
    pub node_index: NodeIndex,

    /// Name of the acknowledging node.
    pub node_name: String,
}

/// Instructs source routers to reload their partition routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadSrcRouterCommand {
    /// Prefix for the ack keys of this command.
    #[serde(alias = "ackKey")]
    pub ack_key_prefix: String,
}

/// A source router's acknowledgment of a reload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadSrcRouterAck {
    /// Name of the acknowledging node.
    pub node_name: String,
}

impl ReloadGatewayCommand {
    /// Create a gateway reload command.
    #[must_use]
    pub fn new(nodes: Vec<NodeIndex>, ack_key_prefix: impl Into<String>) -> Self {
        Self {
            nodes,
            ack_key_prefix: ack_key_prefix.into(),
        }
    }

    /// The acknowledgment a gateway node returns after reloading.
    #[must_use]
    pub fn ack(&self, node_index: NodeIndex, node_name: impl Into<String>) -> ReloadGatewayAck {
        ReloadGatewayAck {
            node_index,
            node_name: node_name.into(),
        }
    }

    /// Whether `node_index` is one of the nodes this command addresses.
    #[must_use]
    pub fn addresses(&self, node_index: NodeIndex) -> bool {
        self.nodes.contains(&node_index)
    }
}

impl AckKeyed for ReloadGatewayCommand {
    fn ack_key_prefix(&self) -> &str {
        &self.ack_key_prefix
    }
}

impl ReloadSrcRouterCommand {
    /// Create a source router reload command.
    #[must_use]
    pub fn new(ack_key_prefix: impl Into<String>) -> Self {
        Self {
            ack_key_prefix: ack_key_prefix.into(),
        }
    }

    /// The acknowledgment a source router returns after reloading.
    #[must_use]
    pub fn ack(&self, node_name: impl Into<String>) -> ReloadSrcRouterAck {
        ReloadSrcRouterAck {
            node_name: node_name.into(),
        }
    }
}

impl AckKeyed for ReloadSrcRouterCommand {
    fn ack_key_prefix(&self) -> &str {
        &self.ack_key_prefix
    }
}
