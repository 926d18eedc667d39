use super::{json_pretty, Context, EXIT_SUCCESS};
use hangar_core::{Lifecycle, LifecycleOutcome};
use hangar_provision::{
    FileLogSink, LifecycleOp, LogSink, MemoryLogSink, MockProvisioner, ProvisionerRegistry,
};
use hangar_schema::{BoxState, ManagedBox};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Serialize)]
struct CycleReport {
    box_id: String,
    operation: String,
    state: String,
    outcome: &'static str,
    log: String,
}

pub fn run(
    ctx: &Context,
    op: LifecycleOp,
    state: &str,
    hard: bool,
    name: &str,
    json: bool,
) -> Result<u8, String> {
    let registry = ProvisionerRegistry::new()
        .with(Arc::new(MockProvisioner::new()))
        .map_err(|e| e.to_string())?;

    let memory = MemoryLogSink::new();
    let file_sink = ctx.config.log_dir.as_ref().map(FileLogSink::new);
    let sink: Arc<dyn LogSink> = match &file_sink {
        Some(f) => Arc::new(f.clone()),
        None => Arc::new(memory.clone()),
    };
    let gate = Lifecycle::new(Arc::new(registry), sink);
    debug!(
        "box logs go to {}",
        file_sink
            .as_ref()
            .map_or_else(|| "memory".to_owned(), |f| f.dir().display().to_string())
    );

    let parsed: BoxState = state.to_owned().into();
    let target = ManagedBox::new(format!("{name}-box"), name, "mock", parsed);
    let outcome = gate.run(op, &target, hard).map_err(|e| e.to_string())?;

    let log = match &file_sink {
        Some(f) => std::fs::read_to_string(f.log_path(&target.id))
            .map_err(|e| format!("failed to read box log: {e}"))?,
        None => memory.contents(&target.id),
    };

    let report = CycleReport {
        box_id: target.id.to_string(),
        operation: op.process_name(hard),
        state: target.state.to_string(),
        outcome: match outcome {
            LifecycleOutcome::Applied => "applied",
            LifecycleOutcome::Skipped => "skipped",
        },
        log,
    };

    if json {
        println!("{}", json_pretty(&report)?);
    } else {
        print!("{}", report.log);
        println!(
            "{} {} from state {}: {}",
            report.operation, report.box_id, report.state, report.outcome
        );
    }
    Ok(EXIT_SUCCESS)
}
