//! Definitions of resources to create.
//!
//! [`ContainerGroupDefinition`] is built fluently, one concern per call, in
//! the order a container group is described to the provider: region, owning
//! resource group, operating system, registry access, volumes, containers,
//! and finally the public DNS label.
//!
//! ```
//! use aci_core::{ContainerDefinition, ContainerGroupDefinition};
//!
//! let definition = ContainerGroupDefinition::new("aci-demo01")
//!     .with_region("eastus")
//!     .with_existing_resource_group("rg-aci-demo01")
//!     .with_linux()
//!     .with_public_image_registry_only()
//!     .without_volume()
//!     .define_container(
//!         ContainerDefinition::new("aci-demo01-1")
//!             .with_image("mcr.microsoft.com/azuredocs/aci-helloworld")
//!             .with_external_tcp_port(80)
//!             .with_cpu_core_count(1.0)
//!             .with_memory_size_in_gb(1.0),
//!     )
//!     .with_dns_prefix("aci-demo01");
//!
//! assert!(definition.validate().is_ok());
//! assert_eq!(definition.external_ports(), vec![80]);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default region used when none is configured.
pub const DEFAULT_REGION: &str = "eastus";

/// Maximum length of a container or DNS name label.
const MAX_LABEL_LEN: usize = 63;

/// Operating system of a container group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OsType {
    #[default]
    Linux,
    Windows,
}

/// Transport protocol of an exposed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortProtocol {
    #[default]
    Tcp,
    Udp,
}

/// When the platform restarts exited containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RestartPolicy {
    #[default]
    Always,
    OnFailure,
    Never,
}

/// Definition of a resource group to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroupDefinition {
    /// Resource group name.
    pub name: String,
    /// Region the group's metadata is stored in.
    pub region: String,
}

impl ResourceGroupDefinition {
    /// Define a resource group in the default region.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: DEFAULT_REGION.to_owned(),
        }
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

/// Definition of a single container inside a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDefinition {
    /// Container name, unique within the group.
    pub name: String,
    /// Image reference.
    pub image: String,
    /// Ports exposed through the group's public IP.
    #[serde(default)]
    pub external_tcp_ports: Vec<u16>,
    /// Requested CPU cores.
    pub cpu_cores: f64,
    /// Requested memory in GiB.
    pub memory_gb: f64,
}

impl ContainerDefinition {
    /// Start defining a container with 1 core and 1.5 GiB, the provider's defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: String::new(),
            external_tcp_ports: Vec::new(),
            cpu_cores: 1.0,
            memory_gb: 1.5,
        }
    }

    /// Set the image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Expose a TCP port on the group's public IP.
    #[must_use]
    pub fn with_external_tcp_port(mut self, port: u16) -> Self {
        self.external_tcp_ports.push(port);
        self
    }

    /// Expose no ports.
    #[must_use]
    pub fn without_ports(mut self) -> Self {
        self.external_tcp_ports.clear();
        self
    }

    /// Set the requested CPU cores.
    #[must_use]
    pub fn with_cpu_core_count(mut self, cores: f64) -> Self {
        self.cpu_cores = cores;
        self
    }

    /// Set the requested memory in GiB.
    #[must_use]
    pub fn with_memory_size_in_gb(mut self, gb: f64) -> Self {
        self.memory_gb = gb;
        self
    }
}

/// Definition of a container group to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerGroupDefinition {
    /// Container group name.
    pub name: String,
    /// Region to run in.
    pub region: String,
    /// Existing resource group to create the group in.
    pub resource_group: String,
    /// Operating system.
    pub os_type: OsType,
    /// Restart policy for all containers.
    pub restart_policy: RestartPolicy,
    /// Public DNS name label. Without one the group gets an IP but no FQDN.
    #[serde(default)]
    pub dns_name_label: Option<String>,
    /// Containers in the group.
    pub containers: Vec<ContainerDefinition>,
}

impl ContainerGroupDefinition {
    /// Start defining a Linux container group in the default region.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: DEFAULT_REGION.to_owned(),
            resource_group: String::new(),
            os_type: OsType::Linux,
            restart_policy: RestartPolicy::Always,
            dns_name_label: None,
            containers: Vec::new(),
        }
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Place the group in an existing resource group.
    #[must_use]
    pub fn with_existing_resource_group(mut self, resource_group: impl Into<String>) -> Self {
        self.resource_group = resource_group.into();
        self
    }

    /// Run Linux containers.
    #[must_use]
    pub fn with_linux(mut self) -> Self {
        self.os_type = OsType::Linux;
        self
    }

    /// Run Windows containers.
    #[must_use]
    pub fn with_windows(mut self) -> Self {
        self.os_type = OsType::Windows;
        self
    }

    /// Pull images from public registries only (no registry credentials).
    #[must_use]
    pub fn with_public_image_registry_only(self) -> Self {
        self
    }

    /// Mount no volumes.
    #[must_use]
    pub fn without_volume(self) -> Self {
        self
    }

    /// Set the restart policy.
    #[must_use]
    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    /// Attach a container.
    #[must_use]
    pub fn define_container(mut self, container: ContainerDefinition) -> Self {
        self.containers.push(container);
        self
    }

    /// Set the public DNS name label.
    #[must_use]
    pub fn with_dns_prefix(mut self, label: impl Into<String>) -> Self {
        self.dns_name_label = Some(label.into());
        self
    }

    /// Every external port across all containers, sorted and deduplicated.
    pub fn external_ports(&self) -> Vec<u16> {
        let mut ports: Vec<u16> = self
            .containers
            .iter()
            .flat_map(|c| c.external_tcp_ports.iter().copied())
            .collect();
        ports.sort_unstable();
        ports.dedup();
        ports
    }

    /// Check the definition against the provider's constraints.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_label(&self.name)?;
        if self.resource_group.is_empty() {
            return Err(CoreError::InvalidDefinition(format!(
                "container group '{}' has no resource group",
                self.name
            )));
        }
        if self.region.is_empty() {
            return Err(CoreError::InvalidDefinition(format!(
                "container group '{}' has no region",
                self.name
            )));
        }
        if self.containers.is_empty() {
            return Err(CoreError::InvalidDefinition(format!(
                "container group '{}' defines no containers",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for container in &self.containers {
            validate_label(&container.name)?;
            if !seen.insert(container.name.as_str()) {
                return Err(CoreError::InvalidDefinition(format!(
                    "duplicate container name '{}'",
                    container.name
                )));
            }
            if container.image.trim().is_empty() {
                return Err(CoreError::InvalidDefinition(format!(
                    "container '{}' has no image",
                    container.name
                )));
            }
            if container.cpu_cores <= 0.0 || !container.cpu_cores.is_finite() {
                return Err(CoreError::InvalidDefinition(format!(
                    "container '{}' requests {} CPU cores",
                    container.name, container.cpu_cores
                )));
            }
            if container.memory_gb <= 0.0 || !container.memory_gb.is_finite() {
                return Err(CoreError::InvalidDefinition(format!(
                    "container '{}' requests {} GiB of memory",
                    container.name, container.memory_gb
                )));
            }
            if container.external_tcp_ports.contains(&0) {
                return Err(CoreError::InvalidDefinition(format!(
                    "container '{}' exposes port 0",
                    container.name
                )));
            }
        }

        if let Some(label) = &self.dns_name_label {
            validate_dns_label(label)?;
        }

        Ok(())
    }
}

fn invalid_name(name: &str, reason: &str) -> CoreError {
    CoreError::InvalidName {
        name: name.to_owned(),
        reason: reason.to_owned(),
    }
}

/// Container group and container names: lowercase alphanumerics and `-`,
/// not starting or ending with `-`.
fn validate_label(name: &str) -> Result<(), CoreError> {
    if name.is_empty() || name.len() > MAX_LABEL_LEN {
        return Err(invalid_name(name, "must be 1-63 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid_name(
            name,
            "only lowercase letters, digits and '-' are allowed",
        ));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(invalid_name(name, "must not start or end with '-'"));
    }
    Ok(())
}

fn validate_dns_label(label: &str) -> Result<(), CoreError> {
    validate_label(label)?;
    if !label.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(invalid_name(label, "DNS label must start with a letter"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web(name: &str) -> ContainerDefinition {
        ContainerDefinition::new(name)
            .with_image("mcr.microsoft.com/azuredocs/aci-helloworld")
            .with_external_tcp_port(80)
            .with_cpu_core_count(0.5)
            .with_memory_size_in_gb(1.0)
    }

    fn sidecar(name: &str) -> ContainerDefinition {
        ContainerDefinition::new(name)
            .with_image("mcr.microsoft.com/azuredocs/aci-tutorial-sidecar")
            .without_ports()
            .with_cpu_core_count(0.5)
            .with_memory_size_in_gb(1.0)
    }

    fn multi() -> ContainerGroupDefinition {
        ContainerGroupDefinition::new("aci-xyz123-multi")
            .with_region("eastus")
            .with_existing_resource_group("rg-aci-xyz123")
            .with_linux()
            .with_public_image_registry_only()
            .without_volume()
            .define_container(web("aci-xyz123-multi-1"))
            .define_container(sidecar("aci-xyz123-multi-2"))
            .with_dns_prefix("aci-xyz123-multi")
    }

    #[test]
    fn multi_container_definition_is_valid() {
        let def = multi();
        assert!(def.validate().is_ok());
        assert_eq!(def.containers.len(), 2);
        assert_eq!(def.external_ports(), vec![80]);
        assert_eq!(def.os_type, OsType::Linux);
        assert_eq!(def.dns_name_label.as_deref(), Some("aci-xyz123-multi"));
    }

    #[test]
    fn container_defaults() {
        let c = ContainerDefinition::new("c");
        assert!((c.cpu_cores - 1.0).abs() < f64::EPSILON);
        assert!((c.memory_gb - 1.5).abs() < f64::EPSILON);
        assert!(c.external_tcp_ports.is_empty());
    }

    #[test]
    fn rejects_missing_containers() {
        let def = ContainerGroupDefinition::new("aci-empty").with_existing_resource_group("rg");
        let err = def.validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidDefinition(msg) if msg.contains("no containers")));
    }

    #[test]
    fn rejects_missing_resource_group() {
        let def = ContainerGroupDefinition::new("aci-lonely").define_container(web("web"));
        assert!(matches!(
            def.validate(),
            Err(CoreError::InvalidDefinition(msg)) if msg.contains("no resource group")
        ));
    }

    #[test]
    fn rejects_duplicate_container_names() {
        let def = ContainerGroupDefinition::new("aci-dup")
            .with_existing_resource_group("rg")
            .define_container(web("same"))
            .define_container(sidecar("same"));
        assert!(matches!(
            def.validate(),
            Err(CoreError::InvalidDefinition(msg)) if msg.contains("duplicate")
        ));
    }

    #[test]
    fn rejects_empty_image_and_bad_resources() {
        let no_image = ContainerGroupDefinition::new("aci-a")
            .with_existing_resource_group("rg")
            .define_container(ContainerDefinition::new("c"));
        assert!(no_image.validate().is_err());

        let zero_cpu = ContainerGroupDefinition::new("aci-b")
            .with_existing_resource_group("rg")
            .define_container(web("c").with_cpu_core_count(0.0));
        assert!(zero_cpu.validate().is_err());

        let nan_memory = ContainerGroupDefinition::new("aci-c")
            .with_existing_resource_group("rg")
            .define_container(web("c").with_memory_size_in_gb(f64::NAN));
        assert!(nan_memory.validate().is_err());
    }

    #[test]
    fn rejects_bad_names() {
        let too_long = "a".repeat(64);
        for name in ["", "Upper", "under_score", "-lead", "trail-", too_long.as_str()] {
            let def = ContainerGroupDefinition::new(name)
                .with_existing_resource_group("rg")
                .define_container(web("web"));
            assert!(
                matches!(def.validate(), Err(CoreError::InvalidName { .. })),
                "name {name:?} should be rejected"
            );
        }
    }

    #[test]
    fn dns_label_must_start_with_letter() {
        let def = multi().with_dns_prefix("1abc");
        assert!(matches!(
            def.validate(),
            Err(CoreError::InvalidName { reason, .. }) if reason.contains("letter")
        ));
    }

    #[test]
    fn resource_group_definition_defaults_region() {
        let rg = ResourceGroupDefinition::new("rg-aci-1");
        assert_eq!(rg.region, DEFAULT_REGION);
        assert_eq!(rg.with_region("westeurope").region, "westeurope");
    }
}
