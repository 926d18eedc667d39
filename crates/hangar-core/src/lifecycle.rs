use crate::CoreError;
use hangar_provision::{LifecycleOp, LogSink, ProvisionerRegistry};
use hangar_schema::{BoxState, ManagedBox};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// What the gate did with a lifecycle request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The provider was invoked and returned successfully.
    Applied,
    /// The box's state does not permit the operation; no provider call was made.
    Skipped,
}

/// Start is legal only from `Stopped`. Stop, restart and suspend are legal
/// from `Running` or `PostError`. Every other state is refused.
pub fn is_transition_allowed(op: LifecycleOp, state: &BoxState) -> bool {
    match op {
        LifecycleOp::Start => matches!(state, BoxState::Stopped),
        LifecycleOp::Stop | LifecycleOp::Restart | LifecycleOp::Suspend => {
            matches!(state, BoxState::Running | BoxState::PostError)
        }
    }
}

/// State-gated dispatcher for box lifecycle operations.
///
/// The gate never writes `state` back to the box and holds no per-box lock:
/// concurrent requests for the same box race at the provider.
pub struct Lifecycle {
    provisioners: Arc<ProvisionerRegistry>,
    logs: Arc<dyn LogSink>,
}

impl Lifecycle {
    pub fn new(provisioners: Arc<ProvisionerRegistry>, logs: Arc<dyn LogSink>) -> Self {
        Self { provisioners, logs }
    }

    pub fn provisioners(&self) -> &ProvisionerRegistry {
        &self.provisioners
    }

    pub fn start(&self, target: &ManagedBox, hard: bool) -> Result<LifecycleOutcome, CoreError> {
        self.run(LifecycleOp::Start, target, hard)
    }

    pub fn stop(&self, target: &ManagedBox, hard: bool) -> Result<LifecycleOutcome, CoreError> {
        self.run(LifecycleOp::Stop, target, hard)
    }

    pub fn restart(&self, target: &ManagedBox, hard: bool) -> Result<LifecycleOutcome, CoreError> {
        self.run(LifecycleOp::Restart, target, hard)
    }

    pub fn suspend(&self, target: &ManagedBox, hard: bool) -> Result<LifecycleOutcome, CoreError> {
        self.run(LifecycleOp::Suspend, target, hard)
    }

    /// Run `op` against `target`.
    ///
    /// A refused transition is reported as `Ok(Skipped)`, not as an error, and
    /// noted in the box log ahead of the `OK` line. A provider failure is
    /// returned as-is and suppresses the final `OK` line.
    /// The box log writer is closed on every path.
    pub fn run(
        &self,
        op: LifecycleOp,
        target: &ManagedBox,
        hard: bool,
    ) -> Result<LifecycleOutcome, CoreError> {
        debug!("{op} cycle for box ({}, {})", target.id, target.full_name());
        let mut writer = self.logs.open(target)?;
        let started = Instant::now();

        let outcome = if is_transition_allowed(op, &target.state) {
            let provisioner = self.provisioners.get(&target.provider)?;
            provisioner.dispatch(op, target, &op.process_name(hard), &mut writer)?;
            LifecycleOutcome::Applied
        } else {
            info!(
                "{op} ({}, {}, {:?}) not performed: lifecycle not allowed from state {}",
                target.full_name(),
                target.status,
                started.elapsed(),
                target.state
            );
            writeln!(
                writer,
                "    {op} not performed: lifecycle not allowed from state {}",
                target.state
            )?;
            LifecycleOutcome::Skipped
        };

        writeln!(
            writer,
            "    {op} ({}, {}, {:?}) OK",
            target.full_name(),
            target.status,
            started.elapsed()
        )?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_provision::{MemoryLogSink, MockProvisioner, ProvisionError};

    struct Fixture {
        mock: Arc<MockProvisioner>,
        logs: MemoryLogSink,
        gate: Lifecycle,
    }

    fn fixture_with(mock: MockProvisioner) -> Fixture {
        let mock = Arc::new(mock);
        let mut registry = ProvisionerRegistry::new();
        registry.register(mock.clone()).unwrap();
        let logs = MemoryLogSink::new();
        let gate = Lifecycle::new(Arc::new(registry), Arc::new(logs.clone()));
        Fixture { mock, logs, gate }
    }

    fn fixture() -> Fixture {
        fixture_with(MockProvisioner::new())
    }

    fn mock_box(state: BoxState) -> ManagedBox {
        ManagedBox::new("b1", "web", "mock", state).with_domain("example.org")
    }

    #[test]
    fn legality_table() {
        use LifecycleOp::{Restart, Start, Stop, Suspend};
        assert!(is_transition_allowed(Start, &BoxState::Stopped));
        assert!(!is_transition_allowed(Start, &BoxState::Running));
        assert!(!is_transition_allowed(Start, &BoxState::PostError));
        for op in [Stop, Restart, Suspend] {
            assert!(is_transition_allowed(op, &BoxState::Running));
            assert!(is_transition_allowed(op, &BoxState::PostError));
            assert!(!is_transition_allowed(op, &BoxState::Stopped));
            assert!(!is_transition_allowed(op, &BoxState::Suspended));
            assert!(!is_transition_allowed(
                op,
                &BoxState::Other("launching".to_owned())
            ));
        }
    }

    #[test]
    fn running_box_accepts_stop_restart_suspend() {
        let f = fixture();
        let b = mock_box(BoxState::Running);
        assert_eq!(f.gate.stop(&b, false).unwrap(), LifecycleOutcome::Applied);
        assert_eq!(f.gate.restart(&b, false).unwrap(), LifecycleOutcome::Applied);
        assert_eq!(f.gate.suspend(&b, false).unwrap(), LifecycleOutcome::Applied);
        let ops: Vec<LifecycleOp> = f.mock.calls().iter().map(|c| c.op).collect();
        assert_eq!(
            ops,
            vec![LifecycleOp::Stop, LifecycleOp::Restart, LifecycleOp::Suspend]
        );
    }

    #[test]
    fn running_box_start_is_skipped_without_provider_call() {
        let f = fixture();
        let b = mock_box(BoxState::Running);
        assert_eq!(f.gate.start(&b, false).unwrap(), LifecycleOutcome::Skipped);
        assert!(f.mock.calls().is_empty());
        let log = f.logs.contents("b1");
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(
            lines[0],
            "    start not performed: lifecycle not allowed from state running"
        );
        assert!(lines[1].starts_with("    start (web.example.org, running, "));
        assert!(log.ends_with(") OK\n"));
    }

    #[test]
    fn stopped_box_starts() {
        let f = fixture();
        let b = mock_box(BoxState::Stopped);
        assert_eq!(f.gate.start(&b, false).unwrap(), LifecycleOutcome::Applied);
        assert_eq!(f.gate.stop(&b, false).unwrap(), LifecycleOutcome::Skipped);
        assert_eq!(f.mock.calls().len(), 1);
    }

    #[test]
    fn hard_flag_prefixes_process_name() {
        let f = fixture();
        let b = mock_box(BoxState::Running);
        f.gate.stop(&b, true).unwrap();
        f.gate.stop(&b, false).unwrap();
        let processes: Vec<String> = f.mock.calls().into_iter().map(|c| c.process).collect();
        assert_eq!(processes, vec!["hard-stop", "stop"]);
    }

    #[test]
    fn provider_output_and_completion_line_share_the_box_log() {
        let f = fixture();
        let b = mock_box(BoxState::PostError);
        f.gate.restart(&b, true).unwrap();
        let log = f.logs.contents("b1");
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "  mock hard-restart web.example.org");
        assert!(lines[1].starts_with("    restart (web.example.org, post_error, "));
    }

    #[test]
    fn provider_error_is_propagated_without_ok_line() {
        let f = fixture_with(MockProvisioner::new().failing_on(LifecycleOp::Stop));
        let b = mock_box(BoxState::Running);
        let err = f.gate.stop(&b, false).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Provision(ProvisionError::Backend(_))
        ));
        assert_eq!(f.mock.calls().len(), 1);
        assert!(!f.logs.contents("b1").contains("OK"));
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let f = fixture();
        let mut b = mock_box(BoxState::Running);
        b.provider = "vmware".to_owned();
        let err = f.gate.stop(&b, false).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Provision(ProvisionError::UnknownProvider(ref p)) if p == "vmware"
        ));
    }

    #[test]
    fn unknown_provider_not_consulted_for_skipped_ops() {
        let f = fixture();
        let mut b = mock_box(BoxState::Running);
        b.provider = "vmware".to_owned();
        assert_eq!(f.gate.start(&b, false).unwrap(), LifecycleOutcome::Skipped);
    }

    #[test]
    fn status_text_is_reported_not_state() {
        let f = fixture();
        let mut b = mock_box(BoxState::Running);
        b.status = "healthy since boot".to_owned();
        f.gate.stop(&b, false).unwrap();
        assert!(f
            .logs
            .contents("b1")
            .contains("    stop (web.example.org, healthy since boot, "));
    }
}
