use std::future::Future;

use aci_core::{ContainerGroup, ContainerGroupDefinition, ResourceGroup, ResourceGroupDefinition};

use crate::error::AzureError;

/// Resource-group operations.
///
/// This trait uses native `async fn` desugaring and is therefore not
/// object-safe; code that works against either the real cloud or a
/// simulated one is generic over it.
pub trait ResourceGroupDirectory: Send + Sync {
    /// Create (or update) a resource group.
    fn create_resource_group(
        &self,
        definition: &ResourceGroupDefinition,
    ) -> impl Future<Output = Result<ResourceGroup, AzureError>> + Send;

    /// Look up a resource group. `Ok(None)` means it does not exist.
    fn get_resource_group(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<ResourceGroup>, AzureError>> + Send;

    /// Start deleting a resource group.
    ///
    /// Deletion is asynchronous on the provider side; the group stays
    /// visible until it is gone. See
    /// [`wait_for_resource_group_deletion`](crate::wait_for_resource_group_deletion).
    fn delete_resource_group(&self, name: &str)
    -> impl Future<Output = Result<(), AzureError>> + Send;
}

/// Container-group operations.
pub trait ContainerGroupDirectory: Send + Sync {
    /// Create a container group from a validated definition.
    ///
    /// Returns the handle as the provider acknowledged it; the group is
    /// usually still provisioning.
    fn create_container_group(
        &self,
        definition: &ContainerGroupDefinition,
    ) -> impl Future<Output = Result<ContainerGroup, AzureError>> + Send;

    /// Look up a container group. `Ok(None)` means it is not (yet) visible.
    fn get_container_group(
        &self,
        resource_group: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<ContainerGroup>, AzureError>> + Send;

    /// List the container groups in a resource group.
    fn list_container_groups(
        &self,
        resource_group: &str,
    ) -> impl Future<Output = Result<Vec<ContainerGroup>, AzureError>> + Send;

    /// Delete a container group by its full ARM id.
    fn delete_container_group_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<(), AzureError>> + Send;

    /// Fetch the current tail of a container's log.
    fn container_logs(
        &self,
        resource_group: &str,
        name: &str,
        container: &str,
        tail: Option<u32>,
    ) -> impl Future<Output = Result<String, AzureError>> + Send;

    /// Re-read a handle's state from the provider.
    ///
    /// Fails with [`AzureError::NotFound`] if the group has disappeared.
    fn refresh_container_group(
        &self,
        handle: &ContainerGroup,
    ) -> impl Future<Output = Result<ContainerGroup, AzureError>> + Send {
        async move {
            self.get_container_group(&handle.resource_group, &handle.name)
                .await?
                .ok_or_else(|| AzureError::NotFound(handle.resource_id().to_string()))
        }
    }
}

/// Everything the walkthrough needs from a cloud.
pub trait CloudDirectory: ResourceGroupDirectory + ContainerGroupDirectory {}

impl<T: ResourceGroupDirectory + ContainerGroupDirectory> CloudDirectory for T {}
