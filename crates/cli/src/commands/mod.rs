pub mod create;
pub mod delete;
pub mod delete_group;
pub mod list;
pub mod logs;
pub mod show;

use aci_azure::CloudDirectory;
use aci_poller::ReadinessPoller;
use anyhow::bail;

use crate::config::CliConfig;

/// What every subcommand works against.
pub struct Context<'a, C> {
    pub cloud: &'a C,
    pub config: &'a CliConfig,
    pub poller: ReadinessPoller,
}

impl<C: CloudDirectory> Context<'_, C> {
    /// Region for new resources.
    pub fn region(&self) -> &str {
        &self.config.azure.location
    }

    /// The resource group named on the command line, else the configured one.
    pub fn resource_group(&self, explicit: Option<&str>) -> anyhow::Result<String> {
        match explicit.or(self.config.azure.resource_group.as_deref()) {
            Some(name) => Ok(name.to_owned()),
            None => bail!(
                "no resource group given; pass --resource-group or set azure.resource_group in the config file"
            ),
        }
    }
}
