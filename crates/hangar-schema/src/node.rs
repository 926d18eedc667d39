use crate::types::{ContainerId, LeaseToken, NodeAddress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Healing lease state carried by every node.
///
/// A node is unlocked when `locked_until` is absent or lies in the past.
/// `token` is only populated by the token-checked lease API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealingData {
    #[serde(default)]
    pub locked_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_failure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<LeaseToken>,
}

impl HealingData {
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}

/// A registered execution host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub address: NodeAddress,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub healing: HealingData,
}

impl Node {
    pub fn new(address: impl Into<NodeAddress>) -> Self {
        Self {
            address: address.into(),
            metadata: BTreeMap::new(),
            healing: HealingData::default(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.healing.is_locked_at(now)
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked_at(Utc::now())
    }

    /// True when at least one `(key, value)` pair of `filter` is present on
    /// this node. An empty filter matches nothing.
    pub fn matches_any(&self, filter: &BTreeMap<String, String>) -> bool {
        filter
            .iter()
            .any(|(key, value)| self.metadata.get(key) == Some(value))
    }
}

/// A container or VM instance placed on a node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Container {
    pub id: ContainerId,
    pub host: NodeAddress,
}
