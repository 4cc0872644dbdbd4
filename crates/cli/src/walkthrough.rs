//! The end-to-end tour: create a resource group and two container groups,
//! inspect them, then clean everything up.

use std::io::Write;

use aci_azure::{CloudDirectory, wait_for_container_group, wait_until_running};
use aci_core::{
    ContainerDefinition, ContainerGroup, ContainerGroupDefinition, ResourceGroupDefinition,
    random_resource_name,
};
use anyhow::Context as _;
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::commands::Context;
use crate::commands::delete_group::delete_resource_group;
use crate::commands::show::write_group_details;
use crate::config::WalkthroughSettings;
use crate::console::Console;
use crate::prompt::Prompter;

#[derive(Args, Debug, Default)]
pub struct WalkthroughArgs {
    /// Resource group to create; generated from the configured prefix if unset.
    #[arg(long)]
    pub resource_group_name: Option<String>,

    /// Container group to create; generated from the configured prefix if unset.
    #[arg(long)]
    pub container_group_name: Option<String>,
}

/// Names of everything the walkthrough creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names {
    pub resource_group: String,
    pub container_group: String,
    pub multi_container_group: String,
}

impl Names {
    pub fn new(args: &WalkthroughArgs, settings: &WalkthroughSettings) -> Self {
        let resource_group = args.resource_group_name.clone().unwrap_or_else(|| {
            random_resource_name(&settings.resource_group_prefix, settings.name_suffix_len)
        });
        let container_group = args.container_group_name.clone().unwrap_or_else(|| {
            random_resource_name(&settings.container_group_prefix, settings.name_suffix_len)
        });
        let multi_container_group = format!("{container_group}-multi");
        Self {
            resource_group,
            container_group,
            multi_container_group,
        }
    }
}

/// What the walkthrough did, printed in JSON mode.
#[derive(Debug, Serialize)]
pub struct WalkthroughReport {
    pub resource_group: String,
    pub listed: Vec<String>,
    pub details: ContainerGroup,
    pub checks_until_running: u32,
    pub logs: String,
    pub deleted_container_groups: Vec<String>,
    pub resource_group_deleted: bool,
}

fn single_container_group(
    name: &str,
    resource_group: &str,
    region: &str,
    settings: &WalkthroughSettings,
) -> ContainerGroupDefinition {
    ContainerGroupDefinition::new(name)
        .with_region(region)
        .with_existing_resource_group(resource_group)
        .with_linux()
        .with_public_image_registry_only()
        .without_volume()
        .define_container(
            ContainerDefinition::new(format!("{name}-1"))
                .with_image(&settings.image)
                .with_external_tcp_port(80)
                .with_cpu_core_count(1.0)
                .with_memory_size_in_gb(1.0),
        )
        .with_dns_prefix(name)
}

fn multi_container_group(
    name: &str,
    resource_group: &str,
    region: &str,
    settings: &WalkthroughSettings,
) -> ContainerGroupDefinition {
    ContainerGroupDefinition::new(name)
        .with_region(region)
        .with_existing_resource_group(resource_group)
        .with_linux()
        .with_public_image_registry_only()
        .without_volume()
        .define_container(
            ContainerDefinition::new(format!("{name}-1"))
                .with_image(&settings.image)
                .with_external_tcp_port(80)
                .with_cpu_core_count(0.5)
                .with_memory_size_in_gb(1.0),
        )
        .define_container(
            ContainerDefinition::new(format!("{name}-2"))
                .with_image(&settings.sidecar_image)
                .without_ports()
                .with_cpu_core_count(0.5)
                .with_memory_size_in_gb(1.0),
        )
        .with_dns_prefix(name)
}

/// Where a freshly created group will answer.
///
/// ARM usually reports the FQDN in the create response; when it does not,
/// the label-based name is predictable.
fn reachable_url(group: &ContainerGroup) -> String {
    group
        .url()
        .unwrap_or_else(|| format!("http://{}.{}.azurecontainer.io", group.name, group.region))
}

pub async fn run<C, P, W>(
    ctx: &Context<'_, C>,
    console: &mut Console<P, W>,
    args: &WalkthroughArgs,
) -> anyhow::Result<()>
where
    C: CloudDirectory,
    P: Prompter,
    W: Write + Send,
{
    let names = Names::new(args, &ctx.config.walkthrough);
    let report = walk(ctx, console, &names).await?;
    // Text mode has already narrated everything.
    console.emit(&report, |_, _| Ok(()))
}

/// Run every step against `ctx.cloud`.
pub async fn walk<C, P, W>(
    ctx: &Context<'_, C>,
    console: &mut Console<P, W>,
    names: &Names,
) -> anyhow::Result<WalkthroughReport>
where
    C: CloudDirectory,
    P: Prompter,
    W: Write + Send,
{
    let settings = &ctx.config.walkthrough;
    let region = ctx.region();
    let rg = names.resource_group.as_str();
    info!(resource_group = rg, container_group = %names.container_group, "starting walkthrough");

    console.say(format_args!("\nCreating resource group '{rg}'..."))?;
    ctx.cloud
        .create_resource_group(&ResourceGroupDefinition::new(rg).with_region(region))
        .await
        .with_context(|| format!("failed to create resource group '{rg}'"))?;

    let single_definition = single_container_group(&names.container_group, rg, region, settings);
    let multi_definition =
        multi_container_group(&names.multi_container_group, rg, region, settings);
    console.say(format_args!(
        "\nCreating container group '{}'...",
        names.container_group
    ))?;
    console.say(format_args!(
        "\nCreating multi-container container group '{}'...",
        names.multi_container_group
    ))?;
    let (single, multi) = futures::try_join!(
        ctx.cloud.create_container_group(&single_definition),
        ctx.cloud.create_container_group(&multi_definition),
    )
    .context("failed to create container groups")?;
    for group in [&single, &multi] {
        console.say(format_args!(
            "Container group '{}' will be reachable at {}",
            group.name,
            reachable_url(group)
        ))?;
    }

    console.say(format_args!(
        "\nListing container groups in resource group '{rg}'..."
    ))?;
    let listed: Vec<String> = ctx
        .cloud
        .list_container_groups(rg)
        .await
        .with_context(|| format!("failed to list container groups in '{rg}'"))?
        .into_iter()
        .map(|group| group.name)
        .collect();
    for name in &listed {
        console.say(name)?;
    }

    console.narrate(|out| {
        write!(
            out,
            "\nGetting container group details for container group '{}'...",
            single.name
        )
    })?;
    let handle = &single;
    let running = console
        .with_progress_dots(&ctx.poller, |poller| async move {
            wait_until_running(ctx.cloud, handle, &poller).await
        })
        .await
        .with_context(|| format!("container group '{}' did not start", single.name))?;
    console.end_progress()?;
    console.narrate(|out| write_group_details(out, &running.value))?;

    let container = running
        .value
        .first_container()
        .with_context(|| format!("container group '{}' has no containers", single.name))?;
    console.say(format_args!("\nLogs for container '{container}':"))?;
    let logs = ctx
        .cloud
        .container_logs(rg, &single.name, container, settings.log_tail)
        .await
        .with_context(|| format!("failed to read logs of container '{container}'"))?;
    console.narrate(|out| out.write_all(logs.as_bytes()))?;

    let mut deleted_container_groups = Vec::new();
    for group in [&single, &multi] {
        let name = group.name.as_str();
        console
            .pause(&format!("\nPress ENTER to delete container group '{name}':"))
            .await?;
        let visible = wait_for_container_group(ctx.cloud, rg, name, &ctx.poller)
            .await
            .with_context(|| format!("container group '{name}' never appeared"))?;
        console.say(format_args!("Deleting container group '{name}'..."))?;
        ctx.cloud
            .delete_container_group_by_id(&visible.value.id)
            .await
            .with_context(|| format!("failed to delete container group '{name}'"))?;
        deleted_container_groups.push(name.to_owned());
    }

    let resource_group_deleted = delete_resource_group(ctx, console, rg, true).await?;

    console.pause("\nPress ENTER to exit...").await?;
    info!(resource_group = rg, resource_group_deleted, "walkthrough finished");

    Ok(WalkthroughReport {
        resource_group: rg.to_owned(),
        listed,
        details: running.value,
        checks_until_running: running.attempts,
        logs,
        deleted_container_groups,
        resource_group_deleted,
    })
}
