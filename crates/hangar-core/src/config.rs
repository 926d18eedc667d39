use crate::CoreError;
use hangar_cluster::ClusterStorage;
use hangar_schema::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_HEALING_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealingConfig {
    #[serde(default = "default_healing_timeout_secs")]
    pub default_timeout_secs: u64,
}

fn default_healing_timeout_secs() -> u64 {
    DEFAULT_HEALING_TIMEOUT_SECS
}

impl Default for HealingConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: DEFAULT_HEALING_TIMEOUT_SECS,
        }
    }
}

impl HealingConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub address: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl NodeConfig {
    pub fn to_node(&self) -> Node {
        Node {
            metadata: self.metadata.clone(),
            ..Node::new(self.address.as_str())
        }
    }
}

/// Process-level settings, read from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HangarConfig {
    /// Directory for per-box operation logs. Logs stay in memory when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub healing: HealingConfig,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

impl HangarConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CoreError::Config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path`, or from the default location. A missing default file
    /// yields the default config; a missing explicit file is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, CoreError> {
        if let Some(p) = path {
            return Self::load(p);
        }
        match default_config_path() {
            Some(p) if p.exists() => Self::load(&p),
            _ => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, CoreError> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.healing.default_timeout_secs == 0 {
            return Err(CoreError::Config(
                "healing.default_timeout_secs must be greater than zero".to_owned(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if node.address.trim().is_empty() {
                return Err(CoreError::Config("node address must not be empty".to_owned()));
            }
            if !seen.insert(node.address.as_str()) {
                return Err(CoreError::Config(format!(
                    "node '{}' is listed more than once",
                    node.address
                )));
            }
        }
        Ok(())
    }

    /// Register every configured node with `storage`.
    pub fn seed(&self, storage: &dyn ClusterStorage) -> Result<usize, CoreError> {
        for node in &self.nodes {
            storage.store_node(node.to_node())?;
        }
        debug!("seeded {} node(s) from config", self.nodes.len());
        Ok(self.nodes.len())
    }
}

/// `$HANGAR_CONFIG`, else `~/.config/hangar/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("HANGAR_CONFIG") {
        return Some(PathBuf::from(p));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config/hangar/config.toml"))
}
