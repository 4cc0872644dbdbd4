use std::sync::atomic::{AtomicU32, Ordering};

use aci_core::{
    ContainerGroup, ContainerGroupDefinition, ContainerSummary, LifecycleState, ProvisioningState,
    ResourceGroup, ResourceGroupDefinition, ResourceId,
};
use dashmap::DashMap;
use tracing::{debug, info};

use crate::directory::{ContainerGroupDirectory, ResourceGroupDirectory};
use crate::error::AzureError;

/// Subscription id reported by a [`MemoryCloud`].
pub const SIMULATED_SUBSCRIPTION_ID: &str = "00000000-0000-0000-0000-000000000000";

#[derive(Debug, Clone)]
struct SimulatedResourceGroup {
    group: ResourceGroup,
    /// Lookups left before a deleted group disappears.
    deleting: Option<u32>,
}

#[derive(Debug, Clone)]
struct SimulatedContainerGroup {
    group: ContainerGroup,
    hidden_lookups: u32,
    pending_lookups: u32,
    address: String,
}

impl SimulatedContainerGroup {
    fn start(&mut self) {
        let group = &mut self.group;
        group.state = LifecycleState::Running;
        group.provisioning_state = ProvisioningState::Succeeded;
        for container in &mut group.containers {
            container.state = Some(LifecycleState::Running.as_str().to_owned());
            container.restart_count = Some(0);
        }
        if group.containers.iter().any(|c| !c.ports.is_empty()) {
            group.ip_address = Some(self.address.clone());
        }
    }
}

/// An in-memory cloud backed by [`DashMap`].
///
/// Newly created container groups are invisible for `visible_after`
/// lookups, then report `Pending` for `running_after` lookups before they
/// turn `Running` with their address populated. Deleted resource groups stay
/// visible in the `Deleting` state for `visible_after` lookups.
#[derive(Debug)]
pub struct MemoryCloud {
    subscription_id: String,
    resource_groups: DashMap<String, SimulatedResourceGroup>,
    container_groups: DashMap<(String, String), SimulatedContainerGroup>,
    visible_after: u32,
    running_after: u32,
    lookups: AtomicU32,
    created: AtomicU32,
}

impl Default for MemoryCloud {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCloud {
    /// Create an empty cloud where new groups are visible and running at once.
    pub fn new() -> Self {
        Self {
            subscription_id: SIMULATED_SUBSCRIPTION_ID.to_owned(),
            resource_groups: DashMap::new(),
            container_groups: DashMap::new(),
            visible_after: 0,
            running_after: 0,
            lookups: AtomicU32::new(0),
            created: AtomicU32::new(0),
        }
    }

    /// Hide new resources for this many lookups.
    #[must_use]
    pub fn with_visible_after(mut self, lookups: u32) -> Self {
        self.visible_after = lookups;
        self
    }

    /// Report new container groups as `Pending` for this many visible lookups.
    #[must_use]
    pub fn with_running_after(mut self, lookups: u32) -> Self {
        self.running_after = lookups;
        self
    }

    /// Subscription id used in generated resource ids.
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Number of container-group lookups served so far.
    pub fn lookup_count(&self) -> u32 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Force a container group into a lifecycle state.
    ///
    /// Returns `false` if no such group exists.
    pub fn set_lifecycle_state(&self, resource_group: &str, name: &str, state: LifecycleState) -> bool {
        match self.container_groups.get_mut(&key(resource_group, name)) {
            Some(mut entry) => {
                let simulated = entry.value_mut();
                simulated.pending_lookups = 0;
                simulated.hidden_lookups = 0;
                if state == LifecycleState::Failed {
                    simulated.group.provisioning_state = ProvisioningState::Failed;
                }
                simulated.group.state = state;
                true
            }
            None => false,
        }
    }

    fn group_id(&self, resource_group: &str, name: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{resource_group}/providers/Microsoft.ContainerInstance/containerGroups/{name}",
            self.subscription_id
        )
    }

    fn resource_group_exists(&self, name: &str) -> bool {
        self.resource_groups
            .get(&name.to_ascii_lowercase())
            .is_some_and(|entry| entry.deleting.is_none())
    }
}

fn key(resource_group: &str, name: &str) -> (String, String) {
    (
        resource_group.to_ascii_lowercase(),
        name.to_ascii_lowercase(),
    )
}

fn simulated_logs(group: &ContainerGroup, container: &str) -> Option<String> {
    let summary = group.containers.iter().find(|c| c.name == container)?;
    let mut lines = vec![format!("pulled image {}", summary.image)];
    if group.state.is_running() {
        lines.push(format!("started container {}", summary.name));
        lines.extend(
            summary
                .ports
                .iter()
                .map(|port| format!("listening on port {port}")),
        );
    }
    Some(lines.join("\n") + "\n")
}

fn tail_lines(content: &str, tail: Option<u32>) -> String {
    let Some(tail) = tail else {
        return content.to_owned();
    };
    let lines: Vec<&str> = content.lines().collect();
    let skip = lines.len().saturating_sub(tail as usize);
    lines[skip..]
        .iter()
        .map(|line| format!("{line}\n"))
        .collect()
}

impl ResourceGroupDirectory for MemoryCloud {
    async fn create_resource_group(
        &self,
        definition: &ResourceGroupDefinition,
    ) -> Result<ResourceGroup, AzureError> {
        if definition.name.trim().is_empty() {
            return Err(AzureError::Configuration(
                "resource group name must not be empty".to_owned(),
            ));
        }
        let group = ResourceGroup {
            id: format!(
                "/subscriptions/{}/resourceGroups/{}",
                self.subscription_id, definition.name
            ),
            name: definition.name.clone(),
            region: definition.region.clone(),
            provisioning_state: ProvisioningState::Succeeded,
        };
        self.resource_groups.insert(
            definition.name.to_ascii_lowercase(),
            SimulatedResourceGroup {
                group: group.clone(),
                deleting: None,
            },
        );
        info!(resource_group = %group.name, "simulated resource group created");
        Ok(group)
    }

    async fn get_resource_group(&self, name: &str) -> Result<Option<ResourceGroup>, AzureError> {
        let name = name.to_ascii_lowercase();
        let found = match self.resource_groups.get_mut(&name) {
            None => return Ok(None),
            Some(mut entry) => match entry.deleting {
                Some(0) => None,
                Some(remaining) => {
                    entry.deleting = Some(remaining - 1);
                    let mut group = entry.group.clone();
                    group.provisioning_state = ProvisioningState::Deleting;
                    Some(group)
                }
                None => Some(entry.group.clone()),
            },
        };
        if found.is_none() {
            self.resource_groups.remove(&name);
        }
        Ok(found)
    }

    async fn delete_resource_group(&self, name: &str) -> Result<(), AzureError> {
        let lower = name.to_ascii_lowercase();
        match self.resource_groups.get_mut(&lower) {
            Some(mut entry) if entry.deleting.is_none() => {
                entry.deleting = Some(self.visible_after);
            }
            Some(_) => {}
            None => return Err(AzureError::NotFound(format!("resource group {name}"))),
        }
        self.container_groups.retain(|(group, _), _| group != &lower);
        info!(resource_group = %name, "simulated resource group deletion accepted");
        Ok(())
    }
}

impl ContainerGroupDirectory for MemoryCloud {
    async fn create_container_group(
        &self,
        definition: &ContainerGroupDefinition,
    ) -> Result<ContainerGroup, AzureError> {
        definition.validate()?;
        if !self.resource_group_exists(&definition.resource_group) {
            return Err(AzureError::NotFound(format!(
                "resource group {}",
                definition.resource_group
            )));
        }

        let ordinal = self.created.fetch_add(1, Ordering::Relaxed) + 1;
        let group = ContainerGroup {
            id: self.group_id(&definition.resource_group, &definition.name),
            name: definition.name.clone(),
            resource_group: definition.resource_group.clone(),
            region: definition.region.clone(),
            state: LifecycleState::Pending,
            provisioning_state: ProvisioningState::Creating,
            fqdn: definition
                .dns_name_label
                .as_ref()
                .map(|label| format!("{label}.{}.azurecontainer.io", definition.region)),
            ip_address: None,
            os_type: definition.os_type,
            containers: definition
                .containers
                .iter()
                .map(|container| ContainerSummary {
                    name: container.name.clone(),
                    image: container.image.clone(),
                    ports: container.external_tcp_ports.clone(),
                    cpu: container.cpu_cores,
                    memory_gb: container.memory_gb,
                    state: None,
                    restart_count: None,
                })
                .collect(),
        };

        let mut simulated = SimulatedContainerGroup {
            group: group.clone(),
            hidden_lookups: self.visible_after,
            pending_lookups: self.running_after,
            address: format!("20.0.{}.{}", ordinal / 256, ordinal % 256),
        };
        if self.visible_after == 0 && self.running_after == 0 {
            simulated.start();
        }
        self.container_groups
            .insert(key(&definition.resource_group, &definition.name), simulated);
        info!(resource_group = %group.resource_group, name = %group.name, "simulated container group created");
        Ok(group)
    }

    async fn get_container_group(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<ContainerGroup>, AzureError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let Some(mut entry) = self.container_groups.get_mut(&key(resource_group, name)) else {
            return Ok(None);
        };
        let simulated = entry.value_mut();

        if simulated.hidden_lookups > 0 {
            simulated.hidden_lookups -= 1;
            debug!(resource_group, name, "simulated container group not visible yet");
            return Ok(None);
        }
        if simulated.pending_lookups > 0 {
            simulated.pending_lookups -= 1;
        } else if simulated.group.state == LifecycleState::Pending {
            simulated.start();
        }
        Ok(Some(simulated.group.clone()))
    }

    async fn list_container_groups(
        &self,
        resource_group: &str,
    ) -> Result<Vec<ContainerGroup>, AzureError> {
        if !self.resource_group_exists(resource_group) {
            return Err(AzureError::NotFound(format!("resource group {resource_group}")));
        }
        let lower = resource_group.to_ascii_lowercase();
        let mut groups: Vec<ContainerGroup> = self
            .container_groups
            .iter()
            .filter(|entry| entry.key().0 == lower)
            .map(|entry| entry.value().group.clone())
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn delete_container_group_by_id(&self, id: &str) -> Result<(), AzureError> {
        let resource =
            ResourceId::parse_arm_id(id).map_err(|e| AzureError::Configuration(e.to_string()))?;
        match self
            .container_groups
            .remove(&key(&resource.resource_group, &resource.name))
        {
            Some(_) => {
                info!(%resource, "simulated container group deleted");
                Ok(())
            }
            None => Err(AzureError::NotFound(resource.to_string())),
        }
    }

    async fn container_logs(
        &self,
        resource_group: &str,
        name: &str,
        container: &str,
        tail: Option<u32>,
    ) -> Result<String, AzureError> {
        let entry = self
            .container_groups
            .get(&key(resource_group, name))
            .ok_or_else(|| AzureError::NotFound(format!("{resource_group}/{name}")))?;
        let content = simulated_logs(&entry.group, container)
            .ok_or_else(|| AzureError::NotFound(format!("{resource_group}/{name}/{container}")))?;
        Ok(tail_lines(&content, tail))
    }
}
