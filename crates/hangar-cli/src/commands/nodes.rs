use super::{json_pretty, Context, EXIT_SUCCESS};
use hangar_cluster::ClusterStorage;
use std::collections::BTreeMap;
use tracing::debug;

pub fn run(ctx: &Context, labels: &[(String, String)], json: bool) -> Result<u8, String> {
    let nodes = if labels.is_empty() {
        ctx.storage.retrieve_nodes()
    } else {
        let filter: BTreeMap<String, String> = labels.iter().cloned().collect();
        ctx.storage.retrieve_nodes_by_metadata(&filter)
    }
    .map_err(|e| e.to_string())?;
    debug!("{} node(s) matched {} label(s)", nodes.len(), labels.len());

    if json {
        println!("{}", json_pretty(&nodes)?);
    } else if nodes.is_empty() {
        println!("no nodes found");
    } else {
        println!("{:<24} {:<8} METADATA", "ADDRESS", "HEALING");
        for node in &nodes {
            let healing = if node.is_locked() { "locked" } else { "-" };
            let metadata = node
                .metadata
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(",");
            println!("{:<24} {:<8} {metadata}", node.address.as_str(), healing);
        }
    }
    Ok(EXIT_SUCCESS)
}

