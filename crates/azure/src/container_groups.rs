use aci_core::{ContainerGroup, ContainerGroupDefinition};
use tracing::{debug, info, instrument};

use crate::arm::{ArmClient, segment};
use crate::directory::ContainerGroupDirectory;
use crate::error::AzureError;
use crate::model::{ContainerGroupResource, LogsResponse, Page};

/// API version for `Microsoft.ContainerInstance/containerGroups`.
pub const CONTAINER_INSTANCE_API_VERSION: &str = "2023-05-01";

const PROVIDER_PATH: &str = "providers/Microsoft.ContainerInstance/containerGroups";

impl ArmClient {
    fn container_groups_path(&self, resource_group: &str) -> Result<String, AzureError> {
        Ok(format!(
            "{}/resourceGroups/{}/{PROVIDER_PATH}",
            self.subscription_scope()?,
            segment(resource_group)
        ))
    }

    fn container_group_path(&self, resource_group: &str, name: &str) -> Result<String, AzureError> {
        Ok(format!(
            "{}/{}",
            self.container_groups_path(resource_group)?,
            segment(name)
        ))
    }
}

impl ContainerGroupDirectory for ArmClient {
    #[instrument(skip(self, definition), fields(resource_group = %definition.resource_group, name = %definition.name))]
    async fn create_container_group(
        &self,
        definition: &ContainerGroupDefinition,
    ) -> Result<ContainerGroup, AzureError> {
        definition.validate()?;
        let path = self.container_group_path(&definition.resource_group, &definition.name)?;
        let url = self.url(&path, CONTAINER_INSTANCE_API_VERSION);
        let body = ContainerGroupResource::from_definition(definition);

        let created: ContainerGroupResource = self.put_json(&url, &body).await?;
        let handle = created.into_handle(&definition.resource_group);
        info!(
            provisioning_state = handle.provisioning_state.as_str(),
            "container group create accepted"
        );
        Ok(handle)
    }

    #[instrument(skip(self))]
    async fn get_container_group(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<Option<ContainerGroup>, AzureError> {
        let path = self.container_group_path(resource_group, name)?;
        let url = self.url(&path, CONTAINER_INSTANCE_API_VERSION);
        let found: Option<ContainerGroupResource> = self.get_optional(&url).await?;
        Ok(found.map(|resource| resource.into_handle(resource_group)))
    }

    #[instrument(skip(self))]
    async fn list_container_groups(
        &self,
        resource_group: &str,
    ) -> Result<Vec<ContainerGroup>, AzureError> {
        let path = self.container_groups_path(resource_group)?;
        let mut next = Some(self.url(&path, CONTAINER_INSTANCE_API_VERSION));
        let mut groups = Vec::new();

        while let Some(url) = next.take() {
            let page: Page<ContainerGroupResource> = self.get_json(&url).await?;
            debug!(count = page.value.len(), "listed container group page");
            groups.extend(
                page.value
                    .into_iter()
                    .map(|resource| resource.into_handle(resource_group)),
            );
            next = page.next_link;
        }

        Ok(groups)
    }

    #[instrument(skip(self))]
    async fn delete_container_group_by_id(&self, id: &str) -> Result<(), AzureError> {
        if !id.starts_with('/') {
            return Err(AzureError::Configuration(format!(
                "not an ARM resource id: {id}"
            )));
        }
        let url = self.url(id, CONTAINER_INSTANCE_API_VERSION);
        self.delete(&url).await?;
        info!("container group deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn container_logs(
        &self,
        resource_group: &str,
        name: &str,
        container: &str,
        tail: Option<u32>,
    ) -> Result<String, AzureError> {
        let mut path = format!(
            "{}/containers/{}/logs",
            self.container_group_path(resource_group, name)?,
            segment(container)
        );
        if let Some(tail) = tail {
            path.push_str(&format!("?tail={tail}"));
        }
        let url = self.url(&path, CONTAINER_INSTANCE_API_VERSION);
        let logs: LogsResponse = self.get_json(&url).await?;
        Ok(logs.content)
    }
}
