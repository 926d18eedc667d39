pub mod cycle;
pub mod heal;
pub mod nodes;

use hangar_cluster::MemoryStorage;
use hangar_core::{CoreError, HangarConfig};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// Per-invocation state: the loaded config and a cluster store seeded from it.
pub struct Context {
    pub config: HangarConfig,
    pub storage: MemoryStorage,
}

impl Context {
    pub fn new(config: HangarConfig) -> Result<Self, CoreError> {
        let storage = MemoryStorage::new();
        config.seed(&storage)?;
        Ok(Self { config, storage })
    }
}

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn parse_label(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}
