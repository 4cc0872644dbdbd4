//! Lifecycle and provisioning states reported by the provider.
//!
//! Both are open sets on the provider side, so unknown labels are kept
//! verbatim in an `Other` variant instead of failing deserialization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Runtime state of a container group (`instanceView.state`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// Accepted but not yet scheduled, or image still pulling.
    #[default]
    Pending,
    /// All containers started.
    Running,
    /// All containers exited successfully.
    Succeeded,
    /// At least one container failed and will not be restarted.
    Failed,
    /// The group was stopped by the user.
    Stopped,
    /// The group was terminated by the platform.
    Terminated,
    /// A label this crate does not know about.
    Other(String),
}

impl LifecycleState {
    /// Returns the provider's label for this state.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Stopped => "Stopped",
            Self::Terminated => "Terminated",
            Self::Other(label) => label,
        }
    }

    /// Returns `true` once the group can no longer reach `Running` on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Stopped | Self::Terminated
        )
    }

    /// Returns `true` if the state is `Running`.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl FromStr for LifecycleState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let state = match s.trim() {
            label if label.eq_ignore_ascii_case("pending") => Self::Pending,
            label if label.eq_ignore_ascii_case("running") => Self::Running,
            label if label.eq_ignore_ascii_case("succeeded") => Self::Succeeded,
            label if label.eq_ignore_ascii_case("failed") => Self::Failed,
            label if label.eq_ignore_ascii_case("stopped") => Self::Stopped,
            label if label.eq_ignore_ascii_case("terminated") => Self::Terminated,
            label => Self::Other(label.to_owned()),
        };
        Ok(state)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LifecycleState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LifecycleState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        let Ok(state) = label.parse::<Self>();
        Ok(state)
    }
}

/// ARM `provisioningState` of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ProvisioningState {
    #[default]
    Creating,
    Updating,
    Deleting,
    Succeeded,
    Failed,
    Canceled,
    Other(String),
}

impl ProvisioningState {
    /// Returns the provider's label for this state.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "Creating",
            Self::Updating => "Updating",
            Self::Deleting => "Deleting",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
            Self::Other(label) => label,
        }
    }

    /// Returns `true` if provisioning ended without producing the resource.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Canceled)
    }
}

impl FromStr for ProvisioningState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let state = match s.trim() {
            // ACI reports `Pending` while the deployment is queued.
            label
                if label.eq_ignore_ascii_case("creating")
                    || label.eq_ignore_ascii_case("pending") =>
            {
                Self::Creating
            }
            label if label.eq_ignore_ascii_case("updating") => Self::Updating,
            label if label.eq_ignore_ascii_case("deleting") => Self::Deleting,
            label if label.eq_ignore_ascii_case("succeeded") => Self::Succeeded,
            label if label.eq_ignore_ascii_case("failed") => Self::Failed,
            label if label.eq_ignore_ascii_case("canceled") => Self::Canceled,
            label => Self::Other(label.to_owned()),
        };
        Ok(state)
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProvisioningState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProvisioningState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        let Ok(state) = label.parse::<Self>();
        Ok(state)
    }
}
