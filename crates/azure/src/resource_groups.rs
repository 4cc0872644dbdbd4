use aci_core::{ResourceGroup, ResourceGroupDefinition};
use tracing::{info, instrument};

use crate::arm::{ArmClient, segment};
use crate::directory::ResourceGroupDirectory;
use crate::error::AzureError;
use crate::model::ResourceGroupResource;

/// API version for `Microsoft.Resources/resourceGroups`.
pub const RESOURCE_GROUPS_API_VERSION: &str = "2021-04-01";

impl ArmClient {
    fn resource_group_url(&self, name: &str) -> Result<String, AzureError> {
        let path = format!(
            "{}/resourcegroups/{}",
            self.subscription_scope()?,
            segment(name)
        );
        Ok(self.url(&path, RESOURCE_GROUPS_API_VERSION))
    }
}

impl ResourceGroupDirectory for ArmClient {
    #[instrument(skip(self, definition), fields(resource_group = %definition.name, region = %definition.region))]
    async fn create_resource_group(
        &self,
        definition: &ResourceGroupDefinition,
    ) -> Result<ResourceGroup, AzureError> {
        if definition.name.trim().is_empty() {
            return Err(AzureError::Configuration(
                "resource group name must not be empty".to_owned(),
            ));
        }
        let url = self.resource_group_url(&definition.name)?;
        let body = ResourceGroupResource::from_definition(definition);
        let created: ResourceGroupResource = self.put_json(&url, &body).await?;
        info!("resource group created");
        Ok(created.into_handle())
    }

    #[instrument(skip(self))]
    async fn get_resource_group(&self, name: &str) -> Result<Option<ResourceGroup>, AzureError> {
        let url = self.resource_group_url(name)?;
        let found: Option<ResourceGroupResource> = self.get_optional(&url).await?;
        Ok(found.map(ResourceGroupResource::into_handle))
    }

    #[instrument(skip(self))]
    async fn delete_resource_group(&self, name: &str) -> Result<(), AzureError> {
        let url = self.resource_group_url(name)?;
        let status = self.delete(&url).await?;
        info!(status = status.as_u16(), "resource group deletion accepted");
        Ok(())
    }
}
