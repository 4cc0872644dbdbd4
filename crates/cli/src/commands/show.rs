use std::io::{self, Write};

use aci_azure::{CloudDirectory, wait_for_container_group, wait_until_running};
use aci_core::ContainerGroup;
use anyhow::Context as _;
use clap::Args;

use super::Context;
use crate::console::Console;
use crate::prompt::Prompter;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Container group name.
    pub name: String,

    /// Resource group holding the container group.
    #[arg(short = 'g', long)]
    pub resource_group: Option<String>,

    /// Wait until the group exists and is running.
    #[arg(long)]
    pub wait: bool,
}

/// Print a container group's name, state, address and region.
pub fn write_group_details(out: &mut impl Write, group: &ContainerGroup) -> io::Result<()> {
    writeln!(out, "{}", group.name)?;
    writeln!(out, "--------------------------------")?;
    writeln!(out, "State:  {}", group.state)?;
    writeln!(out, "FQDN:   {}", group.fqdn.as_deref().unwrap_or_default())?;
    writeln!(out, "IP:     {}", group.ip_address.as_deref().unwrap_or_default())?;
    writeln!(out, "Region: {}", group.region)?;
    for container in &group.containers {
        writeln!(
            out,
            "  {} ({}, {} CPU, {} GB) {}",
            container.name,
            container.image,
            container.cpu,
            container.memory_gb,
            container.state.as_deref().unwrap_or("-"),
        )?;
    }
    Ok(())
}

pub async fn run<C, P, W>(
    ctx: &Context<'_, C>,
    console: &mut Console<P, W>,
    args: &ShowArgs,
) -> anyhow::Result<()>
where
    C: CloudDirectory,
    P: Prompter,
    W: Write + Send,
{
    let resource_group = ctx.resource_group(args.resource_group.as_deref())?;

    let name = args.name.as_str();

    let group = if args.wait {
        let rg = resource_group.as_str();
        let visible = console
            .with_progress_dots(&ctx.poller, |poller| async move {
                wait_for_container_group(ctx.cloud, rg, name, &poller).await
            })
            .await?;
        let handle = &visible.value;
        let running = console
            .with_progress_dots(&ctx.poller, |poller| async move {
                wait_until_running(ctx.cloud, handle, &poller).await
            })
            .await?;
        console.end_progress()?;
        running.value
    } else {
        ctx.cloud
            .get_container_group(&resource_group, name)
            .await?
            .with_context(|| format!("container group '{resource_group}/{name}' not found"))?
    };

    console.emit(&group, |out, group| write_group_details(out, group))
}
