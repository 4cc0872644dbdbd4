use std::io::Write;

use aci_azure::{CloudDirectory, wait_for_resource_group_deletion};
use anyhow::Context as _;
use clap::Args;
use serde::Serialize;

use super::Context;
use crate::console::Console;
use crate::prompt::Prompter;

#[derive(Args, Debug)]
pub struct DeleteGroupArgs {
    /// Resource group to delete, with everything in it.
    #[arg(short = 'g', long)]
    pub resource_group: Option<String>,

    /// Return as soon as the deletion is accepted.
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Debug, Serialize)]
struct GroupDeletion<'a> {
    resource_group: &'a str,
    deleted: bool,
}

/// Ask before deleting `resource_group`, then delete it and wait until it is gone.
///
/// Returns `false` if the deletion was declined.
pub async fn delete_resource_group<C, P, W>(
    ctx: &Context<'_, C>,
    console: &mut Console<P, W>,
    resource_group: &str,
    wait: bool,
) -> anyhow::Result<bool>
where
    C: CloudDirectory,
    P: Prompter,
    W: Write + Send,
{
    if !console
        .confirm(&format!("\nDelete resource group '{resource_group}'? [yes] no: "))
        .await?
    {
        return Ok(false);
    }

    console.say(format_args!("\nDeleting resource group '{resource_group}'..."))?;
    ctx.cloud
        .delete_resource_group(resource_group)
        .await
        .with_context(|| format!("failed to delete resource group '{resource_group}'"))?;

    if wait {
        console
            .with_progress_dots(&ctx.poller, |poller| async move {
                wait_for_resource_group_deletion(ctx.cloud, resource_group, &poller).await
            })
            .await?;
        console.end_progress()?;
    }
    Ok(true)
}

pub async fn run<C, P, W>(
    ctx: &Context<'_, C>,
    console: &mut Console<P, W>,
    args: &DeleteGroupArgs,
) -> anyhow::Result<()>
where
    C: CloudDirectory,
    P: Prompter,
    W: Write + Send,
{
    let resource_group = ctx.resource_group(args.resource_group.as_deref())?;
    let deleted = delete_resource_group(ctx, console, &resource_group, !args.no_wait).await?;

    let outcome = GroupDeletion {
        resource_group: &resource_group,
        deleted,
    };
    console.emit(&outcome, |out, outcome| {
        if outcome.deleted {
            writeln!(out, "Deleted resource group '{}'.", outcome.resource_group)
        } else {
            writeln!(out, "Kept resource group '{}'.", outcome.resource_group)
        }
    })
}

#[cfg(test)]
mod tests {
    use aci_azure::{MemoryCloud, ResourceGroupDirectory};

    use super::*;
    use crate::OutputFormat;
    use crate::commands::tests::{RG, config, context, seed};
    use crate::prompt::{AutoPrompter, ScriptedPrompter};

    fn args() -> DeleteGroupArgs {
        DeleteGroupArgs {
            resource_group: None,
            no_wait: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn confirmed_deletion_waits_until_gone() {
        let cloud = MemoryCloud::new().with_visible_after(2);
        seed(&cloud, &[]).await;
        let config = config();
        let mut console = Console::new(AutoPrompter, Vec::new(), OutputFormat::Text);

        run(&context(&cloud, &config), &mut console, &args())
            .await
            .unwrap();

        let out = String::from_utf8(console.into_parts().1).unwrap();
        assert_eq!(
            out,
            format!(
                "\nDelete resource group '{RG}'? [yes] no: \n\
                 \nDeleting resource group '{RG}'...\n\
                 ..\n\
                 Deleted resource group '{RG}'.\n"
            )
        );
        assert!(cloud.get_resource_group(RG).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn declined_deletion_keeps_the_group() {
        let cloud = MemoryCloud::new();
        seed(&cloud, &[]).await;
        let config = config();
        let mut console = Console::new(ScriptedPrompter::new(["no"]), Vec::new(), OutputFormat::Json);

        run(&context(&cloud, &config), &mut console, &args())
            .await
            .unwrap();

        let (prompter, out) = console.into_parts();
        assert_eq!(prompter.asked(), 1);
        let out = String::from_utf8(out).unwrap();
        let json = out.split_once(": ").unwrap().1;
        let outcome: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(outcome["deleted"], false);
        assert!(cloud.get_resource_group(RG).await.unwrap().is_some());
    }
}
