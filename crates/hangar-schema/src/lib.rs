//! Record types shared by the Hangar cluster store, provisioners, and lifecycle gate.
//!
//! This crate defines the data layer only: string key newtypes (`NodeAddress`,
//! `ContainerId`, `BoxId`, `LeaseToken`), the `Node` record with its healing
//! lease state, the `Container` placement entry, and the `ManagedBox` workload
//! with its `BoxState`.

pub mod node;
pub mod types;
pub mod workload;

pub use node::{Container, HealingData, Node};
pub use types::{BoxId, ContainerId, LeaseToken, NodeAddress};
pub use workload::{BoxState, ManagedBox};
