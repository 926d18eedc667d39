//! Lifecycle orchestration for Hangar boxes.
//!
//! This crate ties the provisioner registry and scoped box logs into the
//! `Lifecycle` gate, which decides whether a start/stop/restart/suspend is legal
//! for a box's current state and dispatches it to the box's provider. It also
//! owns `HangarConfig`, which seeds the cluster store and sets healing defaults.

pub mod config;
pub mod lifecycle;

pub use config::{HangarConfig, HealingConfig, NodeConfig};
pub use lifecycle::{is_transition_allowed, Lifecycle, LifecycleOutcome};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cluster error: {0}")]
    Cluster(#[from] hangar_cluster::ClusterError),
    #[error(transparent)]
    Provision(#[from] hangar_provision::ProvisionError),
    #[error("config error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
