//! Cluster bookkeeping for Hangar.
//!
//! This crate provides the registry that provisioners and healing daemons share:
//! a node table keyed by address, a container index mapping instances and
//! workload names to hosts, and a per-node healing lease that keeps two healers
//! off the same node. Everything is reached through the `ClusterStorage` trait;
//! `MemoryStorage` is the in-process implementation.

pub mod containers;
pub mod healing;
pub mod nodes;
pub mod storage;

pub use healing::HealingLease;
pub use storage::{ClusterStorage, MemoryStorage};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("no such node in storage: {0}")]
    NodeNotFound(String),
    #[error("no such container in storage: {0}")]
    ContainerNotFound(String),
    #[error("node address already registered: {0}")]
    DuplicateAddress(String),
    #[error("healing lease for node {0} is not held by this token")]
    LeaseMismatch(String),
    #[error("invalid healing timeout: {0}")]
    InvalidTimeout(String),
    #[error("cluster table lock poisoned: {0}")]
    LockPoisoned(String),
}
