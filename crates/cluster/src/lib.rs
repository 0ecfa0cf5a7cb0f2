//! Partition migration protocol shared by the cluster coordinator and its nodes.
//!
//! This crate provides:
//! - Migration and job records with their lifecycle statuses
//! - Gateway and source-router reload commands
//! - Node acknowledgments and the ack keys that correlate them
//! - A JSON wire codec over `Bytes` for every record
//!
//! Nothing here performs I/O or holds locks. The coordinator owns status
//! transitions; the types only expose pure accessors and derivations.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod ack_key;
mod codec;
pub mod command;
pub mod error;
pub mod migration;
pub mod status;

pub use ack_key::AckKeyed;
pub use command::{ReloadGatewayAck, ReloadGatewayCommand, ReloadSrcRouterAck, ReloadSrcRouterCommand};
pub use error::{Error, Result};
pub use migration::{
    GATEWAY_RELOAD_ACK_SEGMENT, NodeIndex, PartitionMigration, PartitionMigrationAck,
    PartitionMigrationJob, PartitionMigrationJobHeader, SRC_ROUTER_RELOAD_ACK_SEGMENT,
};
pub use status::{PartitionMigrationJobStatus, PartitionMigrationStatus};
