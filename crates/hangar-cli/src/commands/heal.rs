use super::{json_pretty, Context, EXIT_SUCCESS};
use hangar_cluster::ClusterStorage;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct HealReport {
    address: String,
    timeout_secs: u64,
    is_failure: bool,
    attempts: Vec<bool>,
    released: bool,
}

pub fn run(
    ctx: &Context,
    address: &str,
    timeout: Option<u64>,
    failure: bool,
    attempts: u32,
    json: bool,
) -> Result<u8, String> {
    let timeout = timeout.map_or_else(|| ctx.config.healing.default_timeout(), Duration::from_secs);

    let mut results = Vec::with_capacity(attempts as usize);
    for _ in 0..attempts {
        let acquired = ctx
            .storage
            .lock_node_for_healing(address, failure, timeout)
            .map_err(|e| e.to_string())?;
        debug!("healing lock attempt on {address}: acquired={acquired}");
        results.push(acquired);
    }

    let released = results.contains(&true);
    if released {
        ctx.storage.unlock_node(address).map_err(|e| e.to_string())?;
    }

    let report = HealReport {
        address: address.to_owned(),
        timeout_secs: timeout.as_secs(),
        is_failure: failure,
        attempts: results,
        released,
    };

    if json {
        println!("{}", json_pretty(&report)?);
    } else {
        for (i, acquired) in report.attempts.iter().enumerate() {
            let verdict = if *acquired { "acquired" } else { "denied" };
            println!(
                "attempt {}: healing lock on {address} {verdict} ({}s)",
                i + 1,
                report.timeout_secs
            );
        }
        if report.released {
            println!("released healing lock on {address}");
        }
    }
    Ok(EXIT_SUCCESS)
}
