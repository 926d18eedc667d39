//! Provider backends for Hangar boxes.
//!
//! This crate defines the seam between the lifecycle gate and real
//! infrastructure: the `Provisioner` trait (start/stop/restart/suspend), the
//! `ProvisionerRegistry` that selects a backend by provider name, the
//! `LogSink`/`BoxLogWriter` pair that scopes operation output to one box, and a
//! recording `MockProvisioner` used by tests and the demo CLI.

pub mod logwriter;
pub mod mock;
pub mod provisioner;
pub mod registry;

pub use logwriter::{BoxLogWriter, FileLogSink, LogSink, MemoryLogSink};
pub use mock::{MockProvisioner, RecordedCall};
pub use provisioner::{LifecycleOp, Provisioner};
pub use registry::ProvisionerRegistry;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("provisioner I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no provisioner registered for provider '{0}'")]
    UnknownProvider(String),
    #[error("provisioner '{0}' is already registered")]
    DuplicateProvider(String),
    #[error("provider backend failed: {0}")]
    Backend(String),
    #[error("{operation} not supported by {provider} provisioner")]
    Unsupported { provider: String, operation: String },
}
