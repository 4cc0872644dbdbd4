//! Local handles for remote resources.
//!
//! A handle carries identity plus the last state the provider reported.
//! Attributes such as the public IP or FQDN stay `None` until provisioning
//! has populated them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::definition::OsType;
use crate::error::CoreError;
use crate::state::{LifecycleState, ProvisioningState};

/// Identifies a resource by (resource group, name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    /// Resource group the resource lives in.
    pub resource_group: String,
    /// Resource name, unique within the group and resource type.
    pub name: String,
}

impl ResourceId {
    /// Create a new resource identity.
    pub fn new(resource_group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_group: resource_group.into(),
            name: name.into(),
        }
    }

    /// Parse an ARM resource id such as
    /// `/subscriptions/<sub>/resourceGroups/<rg>/providers/<ns>/<type>/<name>`.
    ///
    /// Segment keys are matched case-insensitively, as ARM itself does.
    pub fn parse_arm_id(id: &str) -> Result<Self, CoreError> {
        let segments: Vec<&str> = id.trim_matches('/').split('/').collect();
        if segments.len() < 4 || segments.len() % 2 != 0 {
            return Err(CoreError::MalformedId(id.to_owned()));
        }

        let mut resource_group = None;
        for pair in segments.chunks(2) {
            if pair[0].eq_ignore_ascii_case("resourceGroups") {
                resource_group = Some(pair[1]);
            }
        }

        let resource_group = resource_group.ok_or_else(|| CoreError::MalformedId(id.to_owned()))?;
        let name = segments[segments.len() - 1];
        if resource_group.is_empty() || name.is_empty() {
            return Err(CoreError::MalformedId(id.to_owned()));
        }

        Ok(Self::new(resource_group, name))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_group, self.name)
    }
}

/// A resource group as last reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroup {
    /// Full ARM resource id.
    pub id: String,
    /// Resource group name.
    pub name: String,
    /// Region the group's metadata is stored in.
    pub region: String,
    /// ARM provisioning state.
    pub provisioning_state: ProvisioningState,
}

/// Summary of one container inside a container group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSummary {
    /// Container name.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Ports the container exposes.
    #[serde(default)]
    pub ports: Vec<u16>,
    /// Requested CPU cores.
    pub cpu: f64,
    /// Requested memory in GiB.
    pub memory_gb: f64,
    /// Current per-container state label, once the instance view exists.
    #[serde(default)]
    pub state: Option<String>,
    /// Number of restarts observed by the platform.
    #[serde(default)]
    pub restart_count: Option<u32>,
}

/// A container group handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerGroup {
    /// Full ARM resource id.
    pub id: String,
    /// Container group name.
    pub name: String,
    /// Owning resource group.
    pub resource_group: String,
    /// Region the group runs in.
    pub region: String,
    /// Runtime lifecycle state.
    pub state: LifecycleState,
    /// ARM provisioning state.
    pub provisioning_state: ProvisioningState,
    /// Public fully qualified domain name, once assigned.
    #[serde(default)]
    pub fqdn: Option<String>,
    /// Public IP address, once assigned.
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Operating system of the group.
    pub os_type: OsType,
    /// Containers in the group.
    #[serde(default)]
    pub containers: Vec<ContainerSummary>,
}

impl ContainerGroup {
    /// Identity of this group.
    pub fn resource_id(&self) -> ResourceId {
        ResourceId::new(&self.resource_group, &self.name)
    }

    /// The HTTP URL the group is reachable at, if it has a public FQDN.
    pub fn url(&self) -> Option<String> {
        self.fqdn.as_ref().map(|fqdn| format!("http://{fqdn}"))
    }

    /// Returns `true` when the runtime state is `Running`.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Name of the first container, if any.
    pub fn first_container(&self) -> Option<&str> {
        self.containers.first().map(|c| c.name.as_str())
    }
}
