mod commands;

use clap::{Parser, Subcommand};
use commands::{Context, EXIT_CONFIG_ERROR, EXIT_FAILURE};
use hangar_core::HangarConfig;
use hangar_provision::LifecycleOp;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "hangar",
    version,
    about = "Cluster node registry and box lifecycle gate"
)]
struct Cli {
    /// Path to the Hangar config file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List configured nodes, optionally filtered by label.
    Nodes {
        /// Label filter `key=value`. Repeatable; a node matching any label is listed.
        #[arg(long = "label", value_parser = commands::parse_label)]
        labels: Vec<(String, String)>,
    },
    /// Try the healing lock on a node, then release it.
    Heal {
        /// Node address.
        address: String,
        /// Lease duration in seconds (defaults to healing.default_timeout_secs).
        #[arg(long)]
        timeout: Option<u64>,
        /// Mark the healing as caused by a node failure.
        #[arg(long, default_value_t = false)]
        failure: bool,
        /// Number of lock attempts before releasing.
        #[arg(long, default_value_t = 2)]
        attempts: u32,
    },
    /// Run a lifecycle operation against a mock box.
    Cycle {
        /// start, stop, restart or suspend.
        op: LifecycleOp,
        /// Current state of the box.
        #[arg(long, default_value = "running")]
        state: String,
        /// Use the forced (hard-) variant.
        #[arg(long, default_value_t = false)]
        hard: bool,
        /// Box name.
        #[arg(long, default_value = "demo")]
        name: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("HANGAR_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match HangarConfig::load_or_default(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };
    let ctx = match Context::new(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let json_output = cli.json;
    let result = match cli.command {
        Commands::Nodes { labels } => commands::nodes::run(&ctx, &labels, json_output),
        Commands::Heal {
            address,
            timeout,
            failure,
            attempts,
        } => commands::heal::run(&ctx, &address, timeout, failure, attempts, json_output),
        Commands::Cycle {
            op,
            state,
            hard,
            name,
        } => commands::cycle::run(&ctx, op, &state, hard, &name, json_output),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
