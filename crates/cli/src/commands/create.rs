use std::io::Write;

use aci_azure::{CloudDirectory, wait_until_running};
use aci_core::{ContainerDefinition, ContainerGroupDefinition, ResourceGroupDefinition};
use anyhow::Context as _;
use clap::Args;

use super::Context;
use super::show::write_group_details;
use crate::console::Console;
use crate::prompt::Prompter;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Container group name; also the name of its single container.
    pub name: String,

    /// Resource group to create the container group in.
    #[arg(short = 'g', long)]
    pub resource_group: Option<String>,

    /// Create the resource group first.
    #[arg(long)]
    pub create_resource_group: bool,

    /// Container image; defaults to the walkthrough image.
    #[arg(long)]
    pub image: Option<String>,

    /// TCP port to expose publicly.
    #[arg(long, default_value_t = 80)]
    pub port: u16,

    /// CPU cores to request.
    #[arg(long, default_value_t = 1.0)]
    pub cpu: f64,

    /// Memory to request, in GB.
    #[arg(long, default_value_t = 1.0)]
    pub memory: f64,

    /// DNS name label; defaults to the group name.
    #[arg(long)]
    pub dns_label: Option<String>,

    /// Return as soon as the request is accepted.
    #[arg(long)]
    pub no_wait: bool,
}

impl CreateArgs {
    fn definition(&self, resource_group: &str, region: &str, default_image: &str) -> ContainerGroupDefinition {
        ContainerGroupDefinition::new(&self.name)
            .with_region(region)
            .with_existing_resource_group(resource_group)
            .with_linux()
            .with_public_image_registry_only()
            .without_volume()
            .define_container(
                ContainerDefinition::new(&self.name)
                    .with_image(self.image.as_deref().unwrap_or(default_image))
                    .with_external_tcp_port(self.port)
                    .with_cpu_core_count(self.cpu)
                    .with_memory_size_in_gb(self.memory),
            )
            .with_dns_prefix(self.dns_label.as_deref().unwrap_or(&self.name))
    }
}

pub async fn run<C, P, W>(
    ctx: &Context<'_, C>,
    console: &mut Console<P, W>,
    args: &CreateArgs,
) -> anyhow::Result<()>
where
    C: CloudDirectory,
    P: Prompter,
    W: Write + Send,
{
    let resource_group = ctx.resource_group(args.resource_group.as_deref())?;
    let definition = args.definition(&resource_group, ctx.region(), &ctx.config.walkthrough.image);
    definition.validate()?;

    if args.create_resource_group {
        ctx.cloud
            .create_resource_group(&ResourceGroupDefinition::new(&resource_group).with_region(ctx.region()))
            .await
            .with_context(|| format!("failed to create resource group '{resource_group}'"))?;
    }

    let created = ctx
        .cloud
        .create_container_group(&definition)
        .await
        .with_context(|| format!("failed to create container group '{}'", args.name))?;
    tracing::info!(resource = %created.resource_id(), "container group create accepted");

    let group = if args.no_wait {
        created
    } else {
        let handle = &created;
        let running = console
            .with_progress_dots(&ctx.poller, |poller| async move {
                wait_until_running(ctx.cloud, handle, &poller).await
            })
            .await?;
        console.end_progress()?;
        running.value
    };

    console.emit(&group, |out, group| {
        write_group_details(out, group)?;
        if let Some(url) = group.url() {
            writeln!(out, "\nReachable at {url}")?;
        }
        Ok(())
    })
}
