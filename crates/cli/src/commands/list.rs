use std::io::Write;

use aci_azure::CloudDirectory;
use anyhow::Context as _;
use clap::Args;

use super::Context;
use crate::console::Console;
use crate::prompt::Prompter;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Resource group to list.
    #[arg(short = 'g', long)]
    pub resource_group: Option<String>,
}

pub async fn run<C, P, W>(
    ctx: &Context<'_, C>,
    console: &mut Console<P, W>,
    args: &ListArgs,
) -> anyhow::Result<()>
where
    C: CloudDirectory,
    P: Prompter,
    W: Write + Send,
{
    let resource_group = ctx.resource_group(args.resource_group.as_deref())?;
    let groups = ctx
        .cloud
        .list_container_groups(&resource_group)
        .await
        .with_context(|| format!("failed to list container groups in '{resource_group}'"))?;

    console.emit(&groups, |out, groups| {
        if groups.is_empty() {
            return writeln!(out, "No container groups in '{resource_group}'.");
        }
        let width = groups.iter().map(|g| g.name.len()).max().unwrap_or(0);
        for group in groups {
            writeln!(
                out,
                "{:<width$}  {:<10}  {}",
                group.name,
                group.state.as_str(),
                group.fqdn.as_deref().unwrap_or("-"),
            )?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use aci_azure::MemoryCloud;
    use aci_core::ContainerGroup;

    use super::*;
    use crate::OutputFormat;
    use crate::commands::tests::{config, context, seed};
    use crate::prompt::AutoPrompter;

    #[tokio::test]
    async fn lists_in_name_order() {
        let cloud = MemoryCloud::new();
        seed(&cloud, &["aci-b", "aci-a"]).await;
        let config = config();
        let mut console = Console::new(AutoPrompter, Vec::new(), OutputFormat::Text);

        run(&context(&cloud, &config), &mut console, &ListArgs { resource_group: None })
            .await
            .unwrap();

        let out = String::from_utf8(console.into_parts().1).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("aci-a  Running"));
        assert!(lines[1].ends_with("aci-b.eastus.azurecontainer.io"));
    }

    #[tokio::test]
    async fn empty_group_in_json_is_an_empty_array() {
        let cloud = MemoryCloud::new();
        seed(&cloud, &[]).await;
        let config = config();
        let mut console = Console::new(AutoPrompter, Vec::new(), OutputFormat::Json);

        run(&context(&cloud, &config), &mut console, &ListArgs { resource_group: None })
            .await
            .unwrap();

        let out = String::from_utf8(console.into_parts().1).unwrap();
        let groups: Vec<ContainerGroup> = serde_json::from_str(&out).unwrap();
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn unknown_resource_group_fails() {
        let cloud = MemoryCloud::new();
        let config = config();
        let mut console = Console::new(AutoPrompter, Vec::new(), OutputFormat::Text);

        let args = ListArgs {
            resource_group: Some("rg-missing".to_owned()),
        };
        let err = run(&context(&cloud, &config), &mut console, &args)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("rg-missing"));
    }
}
