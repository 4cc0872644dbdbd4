use std::io::Write;

use aci_azure::{CloudDirectory, wait_for_container_group};
use anyhow::Context as _;
use clap::Args;
use serde::Serialize;

use super::Context;
use crate::console::Console;
use crate::prompt::Prompter;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Container group name.
    pub name: String,

    /// Resource group holding the container group.
    #[arg(short = 'g', long)]
    pub resource_group: Option<String>,

    /// Wait for the group to become visible before deleting it.
    #[arg(long)]
    pub wait: bool,
}

#[derive(Debug, Serialize)]
struct Deleted<'a> {
    id: &'a str,
    deleted: bool,
}

pub async fn run<C, P, W>(
    ctx: &Context<'_, C>,
    console: &mut Console<P, W>,
    args: &DeleteArgs,
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
        console.end_progress()?;
        visible.value
    } else {
        ctx.cloud
            .get_container_group(&resource_group, name)
            .await?
            .with_context(|| format!("container group '{resource_group}/{name}' not found"))?
    };

    ctx.cloud
        .delete_container_group_by_id(&group.id)
        .await
        .with_context(|| format!("failed to delete container group '{name}'"))?;

    let deleted = Deleted {
        id: &group.id,
        deleted: true,
    };
    console.emit(&deleted, |out, _| writeln!(out, "Deleted container group '{name}'."))
}
