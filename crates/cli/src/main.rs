//! aci
//!
//! A command-line walkthrough of the Azure Container Instances management
//! API: create container groups, wait for them to run, read their logs and
//! clean up.

mod commands;
mod config;
mod console;
mod prompt;
mod walkthrough;

use std::future::Future;
use std::io::{Stdout, Write};
use std::path::PathBuf;

use aci_azure::{
    AUTH_LOCATION_ENV, AzureBaseConfig, AzureError, CloudDirectory, MemoryCloud, Session,
    authenticate,
};
use aci_poller::{CancellationToken, ReadinessPoller};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use crate::commands::Context;
use crate::config::CliConfig;
use crate::console::Console;
use crate::prompt::{AutoPrompter, ConsolePrompter, Prompter};

/// Azure Container Instances walkthrough.
#[derive(Parser, Debug)]
#[command(name = "aci", version, about)]
struct Cli {
    /// Configuration file; `aci.toml` is read when present.
    #[arg(long, env = "ACI_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Accept the default answer to every prompt.
    #[arg(short, long, global = true)]
    yes: bool,

    /// Run against an in-memory cloud instead of Azure.
    #[arg(long, env = "ACI_SIMULATE", global = true)]
    simulate: bool,

    /// Region for new resources.
    #[arg(long, env = "ACI_REGION", global = true)]
    region: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create, inspect and delete container groups end to end.
    Walkthrough(walkthrough::WalkthroughArgs),
    /// Create a single-container group.
    Create(commands::create::CreateArgs),
    /// List the container groups in a resource group.
    List(commands::list::ListArgs),
    /// Show a container group.
    Show(commands::show::ShowArgs),
    /// Print a container's logs.
    Logs(commands::logs::LogsArgs),
    /// Delete a container group.
    Delete(commands::delete::DeleteArgs),
    /// Delete a resource group and everything in it.
    DeleteGroup(commands::delete_group::DeleteGroupArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(region) = &cli.region {
        config.azure.location.clone_from(region);
    }

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_interrupt(cancel.clone()));
    let poller = ReadinessPoller::new(config.poll.to_poll_config()).with_cancellation(cancel);

    if cli.yes {
        let console = Console::new(AutoPrompter, std::io::stdout(), cli.format);
        connect(&cli, &config, poller, console).await
    } else {
        let console = Console::new(ConsolePrompter::default(), std::io::stdout(), cli.format);
        connect(&cli, &config, poller, console).await
    }
}

/// Cancel every wait on Ctrl+C.
async fn cancel_on_interrupt(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received SIGINT, cancelling");
        token.cancel();
    }
}

async fn connect<P: Prompter>(
    cli: &Cli,
    config: &CliConfig,
    poller: ReadinessPoller,
    mut console: Console<P, Stdout>,
) -> anyhow::Result<()> {
    if cli.simulate {
        let cloud = MemoryCloud::new().with_visible_after(1).with_running_after(2);
        console.say(format_args!(
            "Using a simulated cloud (subscription {})",
            cloud.subscription_id()
        ))?;
        dispatch(&cloud, config, poller, &mut console, &cli.command).await
    } else {
        let lookup = |key: &str| std::env::var(key).ok();
        let auth_location = lookup(AUTH_LOCATION_ENV).filter(|path| !path.trim().is_empty());
        let session = sign_in(
            &mut console,
            auth_location.as_deref(),
            authenticate_from_env(&config.azure, lookup),
        )
        .await?;
        dispatch(session.client(), config, poller, &mut console, &cli.command).await
    }
}

/// Overlay the auth file and `AZURE_*` variables read through `lookup` onto
/// `azure`, then authenticate.
async fn authenticate_from_env(
    azure: &AzureBaseConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Session, AzureError> {
    let from_env = AzureBaseConfig::from_vars(lookup)?;
    authenticate(&azure.clone().merged_with(from_env)).await
}

/// Run `attempt`, narrating the outcome.
async fn sign_in<P, W, F>(
    console: &mut Console<P, W>,
    auth_location: Option<&str>,
    attempt: F,
) -> anyhow::Result<Session>
where
    P: Prompter,
    W: Write + Send,
    F: Future<Output = Result<Session, AzureError>>,
{
    match auth_location {
        Some(path) => console.say(format_args!(
            "Authenticating with Azure using credentials in file at {path}"
        ))?,
        None => console.say("Authenticating with Azure")?,
    }

    match attempt.await {
        Ok(session) => {
            console.say(format_args!(
                "Authenticated with subscription {}",
                session.subscription()
            ))?;
            Ok(session)
        }
        Err(err) => {
            console.say(format_args!("\nFailed to authenticate:\n{err}"))?;
            if auth_location.is_none() {
                console.say(format_args!(
                    "Have you set the {AUTH_LOCATION_ENV} environment variable?"
                ))?;
            }
            Err(anyhow::Error::new(err).context("authentication failed"))
        }
    }
}

async fn dispatch<C, P, W>(
    cloud: &C,
    config: &CliConfig,
    poller: ReadinessPoller,
    console: &mut Console<P, W>,
    command: &Command,
) -> anyhow::Result<()>
where
    C: CloudDirectory,
    P: Prompter,
    W: Write + Send,
{
    let ctx = Context {
        cloud,
        config,
        poller,
    };
    match command {
        Command::Walkthrough(args) => walkthrough::run(&ctx, console, args).await,
        Command::Create(args) => commands::create::run(&ctx, console, args).await,
        Command::List(args) => commands::list::run(&ctx, console, args).await,
        Command::Show(args) => commands::show::run(&ctx, console, args).await,
        Command::Logs(args) => commands::logs::run(&ctx, console, args).await,
        Command::Delete(args) => commands::delete::run(&ctx, console, args).await,
        Command::DeleteGroup(args) => commands::delete_group::run(&ctx, console, args).await,
    }
}
