use crate::ProvisionError;
use hangar_schema::ManagedBox;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// A lifecycle operation a provisioner can perform on a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleOp {
    Start,
    Stop,
    Restart,
    Suspend,
}

impl LifecycleOp {
    pub const ALL: [LifecycleOp; 4] = [
        LifecycleOp::Start,
        LifecycleOp::Stop,
        LifecycleOp::Restart,
        LifecycleOp::Suspend,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleOp::Start => "start",
            LifecycleOp::Stop => "stop",
            LifecycleOp::Restart => "restart",
            LifecycleOp::Suspend => "suspend",
        }
    }

    /// Process name handed to the provisioner. Hard variants carry a `hard-`
    /// prefix so backends can skip graceful shutdown.
    pub fn process_name(self, hard: bool) -> String {
        if hard {
            format!("hard-{}", self.as_str())
        } else {
            self.as_str().to_owned()
        }
    }
}

impl fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LifecycleOp::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown lifecycle operation '{s}'"))
    }
}

/// A backend able to drive boxes of one provider type.
///
/// Every operation receives the box, the process name (possibly `hard-`
/// prefixed), and the box's log writer. Output written to `out` becomes part of
/// the box's operation log.
pub trait Provisioner: Send + Sync {
    /// Provider key this backend registers under.
    fn name(&self) -> &str;

    fn start(
        &self,
        target: &ManagedBox,
        process: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProvisionError>;

    fn stop(
        &self,
        target: &ManagedBox,
        process: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProvisionError>;

    fn restart(
        &self,
        target: &ManagedBox,
        process: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProvisionError>;

    fn suspend(
        &self,
        _target: &ManagedBox,
        _process: &str,
        _out: &mut dyn Write,
    ) -> Result<(), ProvisionError> {
        Err(ProvisionError::Unsupported {
            provider: self.name().to_owned(),
            operation: LifecycleOp::Suspend.as_str().to_owned(),
        })
    }

    fn dispatch(
        &self,
        op: LifecycleOp,
        target: &ManagedBox,
        process: &str,
        out: &mut dyn Write,
    ) -> Result<(), ProvisionError> {
        match op {
            LifecycleOp::Start => self.start(target, process, out),
            LifecycleOp::Stop => self.stop(target, process, out),
            LifecycleOp::Restart => self.restart(target, process, out),
            LifecycleOp::Suspend => self.suspend(target, process, out),
        }
    }
}
