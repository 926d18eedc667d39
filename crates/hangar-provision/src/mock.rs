use crate::provisioner::{LifecycleOp, Provisioner};
use crate::ProvisionError;
use hangar_schema::{BoxId, ManagedBox};
use std::collections::HashSet;
use std::io::Write;
use std::sync::Mutex;

/// One operation observed by a [`MockProvisioner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub op: LifecycleOp,
    pub box_id: BoxId,
    pub process: String,
}

/// In-memory provisioner that records every call and writes one line of
/// output per operation. Selected operations can be made to fail.
pub struct MockProvisioner {
    name: String,
    calls: Mutex<Vec<RecordedCall>>,
    failing: HashSet<LifecycleOp>,
}

impl Default for MockProvisioner {
    fn default() -> Self {
        Self::named("mock")
    }
}

impl MockProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            calls: Mutex::new(Vec::new()),
            failing: HashSet::new(),
        }
    }

    #[must_use]
    pub fn failing_on(mut self, op: LifecycleOp) -> Self {
        self.failing.insert(op);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(
        &self,
        op: LifecycleOp,
        target: &ManagedBox,
        process: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProvisionError> {
        self.calls
            .lock()
            .map_err(|e| ProvisionError::Backend(format!("mutex poisoned: {e}")))?
            .push(RecordedCall {
                op,
                box_id: target.id.clone(),
                process: process.to_owned(),
            });

        if self.failing.contains(&op) {
            writeln!(out, "  {} {process} failed for {}", self.name, target.full_name())?;
            return Err(ProvisionError::Backend(format!(
                "mock {process} failed for {}",
                target.id
            )));
        }
        writeln!(out, "  {} {process} {}", self.name, target.full_name())?;
        Ok(())
    }
}

impl Provisioner for MockProvisioner {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(
        &self,
        target: &ManagedBox,
        process: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProvisionError> {
        self.record(LifecycleOp::Start, target, process, out)
    }

    fn stop(
        &self,
        target: &ManagedBox,
        process: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProvisionError> {
        self.record(LifecycleOp::Stop, target, process, out)
    }

    fn restart(
        &self,
        target: &ManagedBox,
        process: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProvisionError> {
        self.record(LifecycleOp::Restart, target, process, out)
    }

    fn suspend(
        &self,
        target: &ManagedBox,
        process: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProvisionError> {
        self.record(LifecycleOp::Suspend, target, process, out)
    }
}
