use std::io::Write;

use aci_azure::CloudDirectory;
use anyhow::Context as _;
use clap::Args;
use serde::Serialize;

use super::Context;
use crate::console::Console;
use crate::prompt::Prompter;

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Container group name.
    pub name: String,

    /// Resource group holding the container group.
    #[arg(short = 'g', long)]
    pub resource_group: Option<String>,

    /// Container to read; defaults to the group's first container.
    #[arg(short, long)]
    pub container: Option<String>,

    /// Only print this many trailing lines.
    #[arg(long)]
    pub tail: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ContainerLogs {
    container: String,
    content: String,
}

pub async fn run<C, P, W>(
    ctx: &Context<'_, C>,
    console: &mut Console<P, W>,
    args: &LogsArgs,
) -> anyhow::Result<()>
where
    C: CloudDirectory,
    P: Prompter,
    W: Write + Send,
{
    let resource_group = ctx.resource_group(args.resource_group.as_deref())?;

    let container = match &args.container {
        Some(container) => container.clone(),
        None => ctx
            .cloud
            .get_container_group(&resource_group, &args.name)
            .await?
            .with_context(|| format!("container group '{resource_group}/{}' not found", args.name))?
            .first_container()
            .with_context(|| format!("container group '{}' has no containers", args.name))?
            .to_owned(),
    };

    let content = ctx
        .cloud
        .container_logs(&resource_group, &args.name, &container, args.tail)
        .await
        .with_context(|| format!("failed to read logs of container '{container}'"))?;

    console.emit(&ContainerLogs { container, content }, |out, logs| {
        out.write_all(logs.content.as_bytes())
    })
}
