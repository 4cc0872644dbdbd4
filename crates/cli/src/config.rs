use std::path::Path;
use std::time::Duration;

use aci_azure::AzureBaseConfig;
use aci_poller::{PollConfig, RetryStrategy};
use anyhow::{Context as _, ensure};
use serde::Deserialize;

/// Default configuration file, read when present.
pub const DEFAULT_CONFIG_PATH: &str = "aci.toml";

/// Contents of `aci.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Credentials, subscription, region and endpoint.
    pub azure: AzureBaseConfig,
    /// How readiness waits poll.
    pub poll: PollSettings,
    /// Names and images used by the walkthrough.
    pub walkthrough: WalkthroughSettings,
}

/// `[poll]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Sleep between checks, in milliseconds.
    pub interval_ms: u64,
    /// Give up after this many seconds. `0` waits forever.
    pub timeout_secs: u64,
    /// Give up after this many checks.
    pub max_attempts: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            timeout_secs: 600,
            max_attempts: None,
        }
    }
}

impl PollSettings {
    /// Build the poller configuration these settings describe.
    pub fn to_poll_config(&self) -> PollConfig {
        let mut config = PollConfig::default()
            .with_strategy(RetryStrategy::Fixed(Duration::from_millis(self.interval_ms)));
        if self.timeout_secs > 0 {
            config = config.with_timeout(Duration::from_secs(self.timeout_secs));
        }
        if let Some(max_attempts) = self.max_attempts {
            config = config.with_max_attempts(max_attempts);
        }
        config
    }
}

/// `[walkthrough]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalkthroughSettings {
    /// Prefix of the generated resource group name.
    pub resource_group_prefix: String,
    /// Prefix of the generated container group name.
    pub container_group_prefix: String,
    /// Random characters appended to each prefix.
    pub name_suffix_len: usize,
    /// Image of the web container.
    pub image: String,
    /// Image of the sidecar in the multi-container group.
    pub sidecar_image: String,
    /// Lines of log output to print; all when unset.
    pub log_tail: Option<u32>,
}

impl Default for WalkthroughSettings {
    fn default() -> Self {
        Self {
            resource_group_prefix: "rg-aci-".to_owned(),
            container_group_prefix: "aci-".to_owned(),
            name_suffix_len: 6,
            image: "mcr.microsoft.com/azuredocs/aci-helloworld".to_owned(),
            sidecar_image: "mcr.microsoft.com/azuredocs/aci-tutorial-sidecar".to_owned(),
            log_tail: None,
        }
    }
}

impl CliConfig {
    /// Load configuration.
    ///
    /// An explicitly named file must exist. The default file is optional;
    /// without it every setting takes its default.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(contents)?;
        ensure!(config.poll.interval_ms > 0, "poll.interval_ms must be greater than 0");
        Ok(config)
    }
}
