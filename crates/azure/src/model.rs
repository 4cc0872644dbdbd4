//! ARM request and response bodies.

use aci_core::{
    ContainerGroup, ContainerGroupDefinition, ContainerSummary, LifecycleState, OsType,
    PortProtocol, ProvisioningState, ResourceGroup, ResourceGroupDefinition, ResourceId,
    RestartPolicy,
};
use serde::{Deserialize, Serialize};

/// A list response; ARM pages through `nextLink`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionResource {
    pub subscription_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ResourceGroupResource {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, skip_serializing)]
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing)]
    pub properties: Option<ResourceGroupProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceGroupProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
}

impl ResourceGroupResource {
    pub fn from_definition(definition: &ResourceGroupDefinition) -> Self {
        Self {
            id: String::new(),
            name: definition.name.clone(),
            location: definition.region.clone(),
            properties: None,
        }
    }

    pub fn into_handle(self) -> ResourceGroup {
        let provisioning_state = self
            .properties
            .and_then(|p| p.provisioning_state)
            .map(|label| parse_state(&label))
            .unwrap_or_default();
        ResourceGroup {
            id: self.id,
            name: self.name,
            region: self.location,
            provisioning_state,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ContainerGroupResource {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, skip_serializing)]
    pub name: String,
    pub location: String,
    pub properties: ContainerGroupProperties,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContainerGroupProperties {
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
    pub containers: Vec<ContainerResource>,
    #[serde(default)]
    pub os_type: OsType,
    #[serde(default)]
    pub restart_policy: RestartPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<IpAddress>,
    #[serde(default, skip_serializing)]
    pub instance_view: Option<GroupInstanceView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ContainerResource {
    pub name: String,
    pub properties: ContainerProperties,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContainerProperties {
    pub image: String,
    #[serde(default)]
    pub ports: Vec<Port>,
    pub resources: ResourceRequirements,
    #[serde(default, skip_serializing)]
    pub instance_view: Option<ContainerInstanceView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Port {
    pub port: u16,
    #[serde(default)]
    pub protocol: PortProtocol,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ResourceRequirements {
    pub requests: ResourceRequests,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceRequests {
    pub cpu: f64,
    #[serde(rename = "memoryInGB")]
    pub memory_in_gb: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IpAddress {
    #[serde(rename = "type")]
    pub kind: String,
    pub ports: Vec<Port>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_name_label: Option<String>,
    #[serde(default, skip_serializing)]
    pub ip: Option<String>,
    #[serde(default, skip_serializing)]
    pub fqdn: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroupInstanceView {
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContainerInstanceView {
    #[serde(default)]
    pub restart_count: Option<u32>,
    #[serde(default)]
    pub current_state: Option<ContainerState>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContainerState {
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogsResponse {
    #[serde(default)]
    pub content: String,
}

fn parse_state<S: std::str::FromStr<Err = std::convert::Infallible>>(label: &str) -> S {
    let Ok(state) = label.parse::<S>();
    state
}

impl ContainerGroupResource {
    pub fn from_definition(definition: &ContainerGroupDefinition) -> Self {
        let containers = definition
            .containers
            .iter()
            .map(|container| ContainerResource {
                name: container.name.clone(),
                properties: ContainerProperties {
                    image: container.image.clone(),
                    ports: container
                        .external_tcp_ports
                        .iter()
                        .map(|&port| Port {
                            port,
                            protocol: PortProtocol::Tcp,
                        })
                        .collect(),
                    resources: ResourceRequirements {
                        requests: ResourceRequests {
                            cpu: container.cpu_cores,
                            memory_in_gb: container.memory_gb,
                        },
                    },
                    instance_view: None,
                },
            })
            .collect();

        let external_ports = definition.external_ports();
        let ip_address = (!external_ports.is_empty()).then(|| IpAddress {
            kind: "Public".to_owned(),
            ports: external_ports
                .into_iter()
                .map(|port| Port {
                    port,
                    protocol: PortProtocol::Tcp,
                })
                .collect(),
            dns_name_label: definition.dns_name_label.clone(),
            ip: None,
            fqdn: None,
        });

        Self {
            id: String::new(),
            name: definition.name.clone(),
            location: definition.region.clone(),
            properties: ContainerGroupProperties {
                provisioning_state: None,
                containers,
                os_type: definition.os_type,
                restart_policy: definition.restart_policy,
                ip_address,
                instance_view: None,
            },
        }
    }

    /// Convert into a handle. `resource_group` is used when the id does not
    /// name one.
    pub fn into_handle(self, resource_group: &str) -> ContainerGroup {
        let resource_group = ResourceId::parse_arm_id(&self.id)
            .map_or_else(|_| resource_group.to_owned(), |id| id.resource_group);
        let properties = self.properties;

        let state = properties
            .instance_view
            .and_then(|view| view.state)
            .map_or(LifecycleState::Pending, |label| parse_state(&label));
        let provisioning_state: ProvisioningState = properties
            .provisioning_state
            .map(|label| parse_state(&label))
            .unwrap_or_default();
        let (ip_address, fqdn) = properties
            .ip_address
            .map_or((None, None), |ip| (ip.ip, ip.fqdn));

        let containers = properties
            .containers
            .into_iter()
            .map(|container| {
                let view = container.properties.instance_view;
                let requests = container.properties.resources.requests;
                ContainerSummary {
                    name: container.name,
                    image: container.properties.image,
                    ports: container.properties.ports.iter().map(|p| p.port).collect(),
                    cpu: requests.cpu,
                    memory_gb: requests.memory_in_gb,
                    state: view
                        .as_ref()
                        .and_then(|v| v.current_state.as_ref())
                        .and_then(|s| s.state.clone()),
                    restart_count: view.and_then(|v| v.restart_count),
                }
            })
            .collect();

        ContainerGroup {
            id: self.id,
            name: self.name,
            resource_group,
            region: self.location,
            state,
            provisioning_state,
            fqdn,
            ip_address,
            os_type: properties.os_type,
            containers,
        }
    }
}

#[cfg(test)]
mod tests {
    use aci_core::ContainerDefinition;
    use serde_json::json;

    use super::*;

    fn definition() -> ContainerGroupDefinition {
        ContainerGroupDefinition::new("aci-demo01")
            .with_region("eastus")
            .with_existing_resource_group("rg-aci-demo01")
            .with_linux()
            .define_container(
                ContainerDefinition::new("aci-demo01-1")
                    .with_image("mcr.microsoft.com/azuredocs/aci-helloworld")
                    .with_external_tcp_port(80)
                    .with_cpu_core_count(1.0)
                    .with_memory_size_in_gb(1.0),
            )
            .with_dns_prefix("aci-demo01")
    }

    #[test]
    fn put_body_matches_arm_shape() {
        let body = serde_json::to_value(ContainerGroupResource::from_definition(&definition()))
            .unwrap();
        assert_eq!(
            body,
            json!({
                "location": "eastus",
                "properties": {
                    "containers": [{
                        "name": "aci-demo01-1",
                        "properties": {
                            "image": "mcr.microsoft.com/azuredocs/aci-helloworld",
                            "ports": [{"port": 80, "protocol": "TCP"}],
                            "resources": {"requests": {"cpu": 1.0, "memoryInGB": 1.0}}
                        }
                    }],
                    "osType": "Linux",
                    "restartPolicy": "Always",
                    "ipAddress": {
                        "type": "Public",
                        "ports": [{"port": 80, "protocol": "TCP"}],
                        "dnsNameLabel": "aci-demo01"
                    }
                }
            })
        );
    }

    #[test]
    fn no_public_ip_without_ports() {
        let definition = ContainerGroupDefinition::new("aci-sidecar")
            .with_existing_resource_group("rg")
            .define_container(
                ContainerDefinition::new("sidecar")
                    .with_image("mcr.microsoft.com/azuredocs/aci-tutorial-sidecar")
                    .without_ports(),
            );
        let body =
            serde_json::to_value(ContainerGroupResource::from_definition(&definition)).unwrap();
        assert!(body["properties"].get("ipAddress").is_none());
    }

    #[test]
    fn response_converts_to_handle() {
        let response = json!({
            "id": "/subscriptions/sub/resourceGroups/rg-aci-demo01/providers/Microsoft.ContainerInstance/containerGroups/aci-demo01",
            "name": "aci-demo01",
            "location": "eastus",
            "properties": {
                "provisioningState": "Succeeded",
                "osType": "Linux",
                "restartPolicy": "Always",
                "containers": [{
                    "name": "aci-demo01-1",
                    "properties": {
                        "image": "mcr.microsoft.com/azuredocs/aci-helloworld",
                        "ports": [{"port": 80, "protocol": "TCP"}],
                        "resources": {"requests": {"cpu": 1.0, "memoryInGB": 1.5}},
                        "instanceView": {"restartCount": 0, "currentState": {"state": "Running"}}
                    }
                }],
                "ipAddress": {
                    "type": "Public",
                    "ip": "52.1.2.3",
                    "fqdn": "aci-demo01.eastus.azurecontainer.io",
                    "ports": [{"port": 80, "protocol": "TCP"}],
                    "dnsNameLabel": "aci-demo01"
                },
                "instanceView": {"state": "Running"}
            }
        });
        let resource: ContainerGroupResource = serde_json::from_value(response).unwrap();
        let handle = resource.into_handle("ignored");

        assert_eq!(handle.resource_group, "rg-aci-demo01");
        assert_eq!(handle.state, LifecycleState::Running);
        assert_eq!(handle.provisioning_state, ProvisioningState::Succeeded);
        assert_eq!(handle.ip_address.as_deref(), Some("52.1.2.3"));
        assert_eq!(
            handle.fqdn.as_deref(),
            Some("aci-demo01.eastus.azurecontainer.io")
        );
        assert_eq!(handle.containers[0].ports, vec![80]);
        assert_eq!(handle.containers[0].state.as_deref(), Some("Running"));
        assert!((handle.containers[0].memory_gb - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn fresh_group_without_instance_view_is_pending() {
        let response = json!({
            "name": "aci-demo01",
            "location": "eastus",
            "properties": {
                "provisioningState": "Pending",
                "containers": []
            }
        });
        let resource: ContainerGroupResource = serde_json::from_value(response).unwrap();
        let handle = resource.into_handle("rg-aci-demo01");
        assert_eq!(handle.resource_group, "rg-aci-demo01");
        assert_eq!(handle.state, LifecycleState::Pending);
        assert_eq!(handle.provisioning_state, ProvisioningState::Creating);
        assert!(handle.ip_address.is_none());
    }

    #[test]
    fn resource_group_roundtrip() {
        let body = serde_json::to_value(ResourceGroupResource::from_definition(
            &ResourceGroupDefinition::new("rg-aci-demo01").with_region("westus"),
        ))
        .unwrap();
        assert_eq!(body, json!({"location": "westus"}));

        let resource: ResourceGroupResource = serde_json::from_value(json!({
            "id": "/subscriptions/sub/resourceGroups/rg-aci-demo01",
            "name": "rg-aci-demo01",
            "location": "westus",
            "properties": {"provisioningState": "Succeeded"}
        }))
        .unwrap();
        let handle = resource.into_handle();
        assert_eq!(handle.name, "rg-aci-demo01");
        assert_eq!(handle.provisioning_state, ProvisioningState::Succeeded);
    }
}
