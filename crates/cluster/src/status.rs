//! Lifecycle statuses for migrations and their jobs.
//!
//! Both lifecycles are linear. Variants are declared in lifecycle order, so
//! `Ord` compares how far along a record is.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Aggregate status of a partition migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PartitionMigrationStatus {
    /// Migration created and jobs defined; no commands issued yet.
    #[serde(rename = "new")]
    New,

    /// Gateway reload issued; awaiting a gateway ack from every addressed node.
    #[serde(rename = "reloading-gw")]
    ReloadingGateway,

    /// Source-router reload issued; awaiting a router ack from every node.
    #[serde(rename = "reloading-srcrouter", alias = "reloading-router")]
    ReloadingSrcRouter,

    /// Partition data transfer in progress, tracked per job.
    #[serde(rename = "migrating")]
    Migrating,

    /// All jobs completed and all acks collected.
    #[serde(rename = "completed")]
    Completed,
}

impl PartitionMigrationStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::ReloadingGateway,
        Self::ReloadingSrcRouter,
        Self::Migrating,
        Self::Completed,
    ];

    /// The wire value of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::ReloadingGateway => "reloading-gw",
            Self::ReloadingSrcRouter => "reloading-srcrouter",
            Self::Migrating => "migrating",
            Self::Completed => "completed",
        }
    }

    /// Whether no further transition can follow this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for PartitionMigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionMigrationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "reloading-gw" => Ok(Self::ReloadingGateway),
            "reloading-srcrouter" | "reloading-router" => Ok(Self::ReloadingSrcRouter),
            "migrating" => Ok(Self::Migrating),
            "completed" => Ok(Self::Completed),
            other => Err(Error::UnknownStatus {
                kind: "partition migration",
                value: other.to_string(),
            }),
        }
    }
}

/// Status of a single partition migration job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionMigrationJobStatus {
    /// Job dispatched, nothing moved yet.
    New,

    /// Partitions have been moved to the target node.
    Moved,

    /// Job completed.
    Completed,
}

impl PartitionMigrationJobStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::New, Self::Moved, Self::Completed];

    /// The wire value of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Moved => "moved",
            Self::Completed => "completed",
        }
    }

    /// Whether no further transition can follow this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for PartitionMigrationJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionMigrationJobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "moved" => Ok(Self::Moved),
            "completed" => Ok(Self::Completed),
            other => Err(Error::UnknownStatus {
                kind: "partition migration job",
                value: other.to_string(),
            }),
        }
    }
}
