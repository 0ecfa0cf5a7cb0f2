//! Partition migration records.
//!
//! A [`PartitionMigration`] is a passive value: the coordinator that owns it
//! mutates [`PartitionMigration::status`] directly as acknowledgments
//! complete, and everything else here is a pure accessor or derivation. That
//! keeps the record cheap to store, ship, and compare between phases.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ack_key::{self, AckKeyed};
use crate::command::{ReloadGatewayCommand, ReloadSrcRouterCommand};
use crate::error::{Error, Result};
use crate::status::{PartitionMigrationJobStatus, PartitionMigrationStatus};

/// Compact index of a node in the cluster membership table.
pub type NodeIndex = usize;

/// Ack key segment for gateway reload acknowledgments.
pub const GATEWAY_RELOAD_ACK_SEGMENT: &str = "reload-gw";

/// Ack key segment for source-router reload acknowledgments.
pub const SRC_ROUTER_RELOAD_ACK_SEGMENT: &str = "reload-srcrouter";

/// The overall migration of a set of partitions between nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionMigration {
    /// Unique identifier of the migration.
    pub id: String,

    /// Current lifecycle status.
    pub status: PartitionMigrationStatus,

    /// One header per (source, target, partition set) unit of work.
    pub jobs: Vec<PartitionMigrationJobHeader>,

    /// Prefix namespacing the ack keys of this migration.
    #[serde(alias = "ackKey")]
    pub ack_key_prefix: String,
}

/// Basic information about a partition migration job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionMigrationJobHeader {
    /// Identifier of the job, unique within its migration.
    pub job_id: String,

    /// Index of the node the partitions move from.
    pub source_node: NodeIndex,

    /// Index of the node the partitions move to.
    pub target_node: NodeIndex,

    /// Identifiers of the partitions moved by this job.
    pub partitions: Vec<String>,
}

/// A dispatched job: its header plus per-job progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionMigrationJob {
    /// The job being tracked.
    #[serde(flatten)]
    pub header: PartitionMigrationJobHeader,

    /// Migration this job belongs to.
    pub migration_id: String,

    /// Current job status.
    pub status: PartitionMigrationJobStatus,
}

/// A node's acknowledgment of a migration announcement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionMigrationAck {
    /// Index of the acknowledging node.
    pub node_index: NodeIndex,

    /// Name of the acknowledging node.
    pub node_name: String,
}

impl PartitionMigration {
    /// Create a migration in the `new` status.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        jobs: Vec<PartitionMigrationJobHeader>,
        ack_key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            status: PartitionMigrationStatus::New,
            jobs,
            ack_key_prefix: ack_key_prefix.into(),
        }
    }

    /// The distinct nodes partitions are read from.
    #[must_use]
    pub fn source_nodes(&self) -> BTreeSet<NodeIndex> {
        self.jobs.iter().map(|job| job.source_node).collect()
    }

    /// The distinct nodes partitions are installed on.
    #[must_use]
    pub fn target_nodes(&self) -> BTreeSet<NodeIndex> {
        self.jobs.iter().map(|job| job.target_node).collect()
    }

    /// Every node taking part in the migration, as source or target.
    #[must_use]
    pub fn nodes(&self) -> BTreeSet<NodeIndex> {
        self.jobs
            .iter()
            .flat_map(|job| [job.source_node, job.target_node])
            .collect()
    }

    /// The acknowledgment a node returns after accepting this migration.
    ///
    /// The node is not checked against the migration's jobs.
    #[must_use]
    pub fn ack(&self, node_index: NodeIndex, node_name: impl Into<String>) -> PartitionMigrationAck {
        PartitionMigrationAck {
            node_index,
            node_name: node_name.into(),
        }
    }

    /// Derive the command reloading the gateways of every participating node.
    #[must_use]
    pub fn reload_gateway_command(&self) -> ReloadGatewayCommand {
        let command = ReloadGatewayCommand {
            nodes: self.nodes().into_iter().collect(),
            ack_key_prefix: ack_key::join([self.ack_key_prefix.as_str(), GATEWAY_RELOAD_ACK_SEGMENT]),
        };
        debug!(
            migration_id = %self.id,
            nodes = ?command.nodes,
            ack_key_prefix = %command.ack_key_prefix,
            "derived gateway reload command"
        );
        command
    }

    /// Derive the command reloading the source routers.
    #[must_use]
    pub fn reload_src_router_command(&self) -> ReloadSrcRouterCommand {
        let command = ReloadSrcRouterCommand {
            ack_key_prefix: ack_key::join([self.ack_key_prefix.as_str(), SRC_ROUTER_RELOAD_ACK_SEGMENT]),
        };
        debug!(
            migration_id = %self.id,
            ack_key_prefix = %command.ack_key_prefix,
            "derived source router reload command"
        );
        command
    }

    /// Job records ready for dispatch, one per header, all in the `new` status.
    #[must_use]
    pub fn dispatch_jobs(&self) -> Vec<PartitionMigrationJob> {
        let jobs: Vec<_> = self
            .jobs
            .iter()
            .map(|header| PartitionMigrationJob::new(self.id.clone(), header.clone()))
            .collect();
        debug!(migration_id = %self.id, count = jobs.len(), "dispatching migration jobs");
        jobs
    }

    /// Check the structural invariants of the migration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMigration`] if the id is empty, there are no
    /// jobs, a job id repeats, or any job header is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::invalid("", "migration id is empty"));
        }

        if self.jobs.is_empty() {
            debug!(migration_id = %self.id, "rejecting migration without jobs");
            return Err(Error::invalid(&self.id, "migration has no jobs"));
        }

        let mut seen = HashSet::with_capacity(self.jobs.len());
        for job in &self.jobs {
            job.validate().map_err(|err| match err {
                Error::InvalidMigration { reason, .. } => Error::invalid(&self.id, reason),
                other => other,
            })?;

            if !seen.insert(job.job_id.as_str()) {
                debug!(migration_id = %self.id, job_id = %job.job_id, "rejecting duplicate job id");
                return Err(Error::invalid(
                    &self.id,
                    format!("duplicate job id {:?}", job.job_id),
                ));
            }
        }

        Ok(())
    }
}

impl AckKeyed for PartitionMigration {
    fn ack_key_prefix(&self) -> &str {
        &self.ack_key_prefix
    }
}

impl PartitionMigrationJobHeader {
    /// Create a job header.
    #[must_use]
    pub fn new(
        job_id: impl Into<String>,
        source_node: NodeIndex,
        target_node: NodeIndex,
        partitions: Vec<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            source_node,
            target_node,
            partitions,
        }
    }

    /// Check the structural invariants of the job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMigration`] if the job id is empty, source and
    /// target are the same node, or no partitions are listed.
    pub fn validate(&self) -> Result<()> {
        if self.job_id.is_empty() {
            return Err(Error::invalid("", "job id is empty"));
        }
        if self.source_node == self.target_node {
            return Err(Error::invalid(
                "",
                format!(
                    "job {:?} moves partitions from node {} to itself",
                    self.job_id, self.source_node
                ),
            ));
        }
        if self.partitions.is_empty() {
            return Err(Error::invalid(
                "",
                format!("job {:?} has no partitions", self.job_id),
            ));
        }
        Ok(())
    }
}

impl PartitionMigrationJob {
    /// Create a job record in the `new` status.
    #[must_use]
    pub fn new(migration_id: impl Into<String>, header: PartitionMigrationJobHeader) -> Self {
        Self {
            header,
            migration_id: migration_id.into(),
            status: PartitionMigrationJobStatus::New,
        }
    }

    /// The header this job was dispatched from.
    #[must_use]
    pub const fn header(&self) -> &PartitionMigrationJobHeader {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tracing_test::traced_test;

    fn job(id: &str, source: NodeIndex, target: NodeIndex, partitions: &[&str]) -> PartitionMigrationJobHeader {
        PartitionMigrationJobHeader::new(
            id,
            source,
            target,
            partitions.iter().map(ToString::to_string).collect(),
        )
    }

    fn migration() -> PartitionMigration {
        PartitionMigration::new(
            "migration-1",
            vec![
                job("job-1", 0, 1, &["ws1-0", "ws1-1"]),
                job("job-2", 0, 2, &["ws1-2", "ws1-3"]),
                job("job-3", 2, 0, &["ws1-4"]),
            ],
            "ack",
        )
    }

    #[test]
    fn test_node_in_both_sets() {
        let m = migration();
        assert_eq!(m.source_nodes(), BTreeSet::from([0, 2]));
        assert_eq!(m.target_nodes(), BTreeSet::from([0, 1, 2]));
        assert_eq!(m.nodes(), BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn test_empty_jobs_yield_empty_sets() {
        let m = PartitionMigration::new("m", Vec::new(), "ack");
        assert!(m.source_nodes().is_empty());
        assert!(m.target_nodes().is_empty());
    }

    #[test]
    #[traced_test]
    fn test_reload_commands_namespace_ack_keys() {
        let m = migration();

        let gateway = m.reload_gateway_command();
        assert_eq!(gateway.nodes, vec![0, 1, 2]);
        assert_eq!(gateway.ack_key_prefix, "ack/reload-gw");
        assert_eq!(gateway.ack_key("node-0"), "ack/reload-gw/node-0");

        let router = m.reload_src_router_command();
        assert_eq!(router.ack_key_prefix, "ack/reload-srcrouter");

        let keys = [
            m.ack_key("node-0"),
            gateway.ack_key("node-0"),
            router.ack_key("node-0"),
        ];
        assert_eq!(keys.iter().collect::<HashSet<_>>().len(), keys.len());
        assert!(logs_contain("derived gateway reload command"));
    }

    #[test]
    fn test_reload_commands_with_empty_prefix() {
        let m = PartitionMigration::new("m", vec![job("j", 0, 1, &["p"])], "");
        assert_eq!(m.reload_gateway_command().ack_key_prefix, "reload-gw");
        assert_eq!(m.reload_src_router_command().ack_key_prefix, "reload-srcrouter");
        assert_eq!(m.ack_key("node-0"), "node-0");
    }

    #[test]
    fn test_dispatch_jobs() {
        let m = migration();
        let jobs = m.dispatch_jobs();

        assert_eq!(jobs.len(), m.jobs.len());
        for (dispatched, header) in jobs.iter().zip(&m.jobs) {
            assert_eq!(dispatched.header(), header);
            assert_eq!(dispatched.migration_id, "migration-1");
            assert_eq!(dispatched.status, PartitionMigrationJobStatus::New);
        }
    }

    #[test]
    fn test_dispatched_jobs_are_independent() {
        let m = migration();
        let mut jobs = m.dispatch_jobs();
        jobs[0].header.partitions[0] = "changed".to_string();
        jobs[0].status = PartitionMigrationJobStatus::Moved;

        assert_eq!(m.jobs[0].partitions[0], "ws1-0");
    }

    #[test]
    fn test_validate_ok() {
        assert!(migration().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_invalid_migrations() {
        let mut m = migration();
        m.jobs.clear();
        assert_matches!(
            m.validate(),
            Err(Error::InvalidMigration { migration_id, .. }) if migration_id == "migration-1"
        );

        let mut m = migration();
        m.id.clear();
        assert_matches!(m.validate(), Err(Error::InvalidMigration { .. }));

        let mut m = migration();
        m.jobs[1].job_id = "job-1".to_string();
        assert_matches!(
            m.validate(),
            Err(Error::InvalidMigration { reason, .. }) if reason.contains("duplicate")
        );

        let mut m = migration();
        m.jobs[0].target_node = m.jobs[0].source_node;
        assert_matches!(
            m.validate(),
            Err(Error::InvalidMigration { migration_id, reason })
                if migration_id == "migration-1" && reason.contains("itself")
        );

        let mut m = migration();
        m.jobs[2].partitions.clear();
        assert_matches!(m.validate(), Err(Error::InvalidMigration { .. }));
    }

    #[test]
    fn test_job_flattens_header_on_the_wire() {
        let dispatched = PartitionMigrationJob::new("migration-1", job("job-1", 0, 1, &["ws1-0"]));
        let value = serde_json::to_value(&dispatched).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "jobId": "job-1",
                "sourceNode": 0,
                "targetNode": 1,
                "partitions": ["ws1-0"],
                "migrationId": "migration-1",
                "status": "new",
            })
        );
    }

    #[test]
    fn test_legacy_ack_key_field() {
        let json = r#"{"id":"m","status":"reloading-router","jobs":[],"ackKey":"legacy"}"#;
        let m: PartitionMigration = serde_json::from_str(json).unwrap();
        assert_eq!(m.ack_key_prefix, "legacy");
        assert_eq!(m.status, PartitionMigrationStatus::ReloadingSrcRouter);
    }
}
