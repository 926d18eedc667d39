use crate::types::BoxId;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Lifecycle phase of a box as last reported by its provider.
///
/// Only the named variants carry meaning for the lifecycle gate. Anything a
/// provider reports beyond them is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BoxState {
    Stopped,
    Running,
    PostError,
    Suspended,
    Other(String),
}

impl BoxState {
    pub fn as_str(&self) -> &str {
        match self {
            BoxState::Stopped => "stopped",
            BoxState::Running => "running",
            BoxState::PostError => "post_error",
            BoxState::Suspended => "suspended",
            BoxState::Other(s) => s,
        }
    }
}

impl fmt::Display for BoxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoxState {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "stopped" => BoxState::Stopped,
            "running" => BoxState::Running,
            "post_error" | "posterror" | "post-error" => BoxState::PostError,
            "suspended" => BoxState::Suspended,
            _ => BoxState::Other(s.to_owned()),
        })
    }
}

impl From<String> for BoxState {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(state) => state,
            Err(never) => match never {},
        }
    }
}

impl From<BoxState> for String {
    fn from(state: BoxState) -> Self {
        match state {
            BoxState::Other(s) => s,
            named => named.as_str().to_owned(),
        }
    }
}

/// A provisioned workload (container or VM) as seen by the lifecycle gate.
///
/// The gate only reads a box. Persisting state changes is the provider's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagedBox {
    pub id: BoxId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub provider: String,
    pub state: BoxState,
    #[serde(default)]
    pub status: String,
}

impl ManagedBox {
    pub fn new(id: impl Into<BoxId>, name: &str, provider: &str, state: BoxState) -> Self {
        let status = state.to_string();
        Self {
            id: id.into(),
            name: name.to_owned(),
            domain: None,
            provider: provider.to_owned(),
            state,
            status,
        }
    }

    #[must_use]
    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_owned());
        self
    }

    /// `name.domain`, or just `name` when no domain is set.
    pub fn full_name(&self) -> String {
        match self.domain.as_deref() {
            Some(domain) if !domain.is_empty() => format!("{}.{domain}", self.name),
            _ => self.name.clone(),
        }
    }
}
