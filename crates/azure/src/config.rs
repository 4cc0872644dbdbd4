use std::path::Path;

use aci_core::DEFAULT_REGION;
use serde::{Deserialize, Serialize};

use crate::error::AzureError;

/// Environment variable naming an SDK auth file.
pub const AUTH_LOCATION_ENV: &str = "AZURE_AUTH_LOCATION";

/// Default Azure Resource Manager endpoint.
pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// Base configuration for talking to Azure Resource Manager.
///
/// Contains the service principal credentials, the subscription to work in,
/// a default resource group and region, and an optional endpoint URL
/// override for local development or tests.
#[derive(Clone, Serialize, Deserialize)]
pub struct AzureBaseConfig {
    /// Azure AD tenant ID.
    #[serde(default)]
    pub tenant_id: Option<String>,

    /// Azure AD application (client) ID.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Azure AD client credential (service principal). Redacted in `Debug`.
    #[serde(default)]
    pub client_credential: Option<String>,

    /// Azure subscription ID. The first accessible subscription is used when unset.
    #[serde(default)]
    pub subscription_id: Option<String>,

    /// Default resource group for commands that operate on one.
    #[serde(default)]
    pub resource_group: Option<String>,

    /// Azure region / location (e.g. `"eastus"`).
    #[serde(default = "default_location")]
    pub location: String,

    /// Optional Resource Manager endpoint override.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

fn default_location() -> String {
    DEFAULT_REGION.to_owned()
}

impl std::fmt::Debug for AzureBaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureBaseConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id.as_ref().map(|_| "[REDACTED]"))
            .field(
                "client_credential",
                &self.client_credential.as_ref().map(|_| "[REDACTED]"),
            )
            .field("subscription_id", &self.subscription_id)
            .field("resource_group", &self.resource_group)
            .field("location", &self.location)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// The JSON written by `az ad sp create-for-rbac --sdk-auth`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthFile {
    client_id: Option<String>,
    client_secret: Option<String>,
    subscription_id: Option<String>,
    tenant_id: Option<String>,
    resource_manager_endpoint_url: Option<String>,
}

impl AzureBaseConfig {
    /// Create a new `AzureBaseConfig` with the given location.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            tenant_id: None,
            client_id: None,
            client_credential: None,
            subscription_id: None,
            resource_group: None,
            location: location.into(),
            endpoint_url: None,
        }
    }

    /// Load service principal settings from an SDK auth file.
    pub fn from_auth_file(path: impl AsRef<Path>) -> Result<Self, AzureError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AzureError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_auth_json(&contents)
    }

    fn from_auth_json(contents: &str) -> Result<Self, AzureError> {
        let auth: AuthFile = serde_json::from_str(contents)
            .map_err(|e| AzureError::Configuration(format!("invalid auth file: {e}")))?;

        Ok(Self {
            tenant_id: auth.tenant_id,
            client_id: auth.client_id,
            client_credential: auth.client_secret,
            subscription_id: auth.subscription_id,
            endpoint_url: auth
                .resource_manager_endpoint_url
                .map(|url| url.trim_end_matches('/').to_owned())
                .filter(|url| !url.is_empty()),
            ..Self::default()
        })
    }

    /// Build a configuration from the process environment.
    ///
    /// Reads the auth file named by `AZURE_AUTH_LOCATION` when set, then
    /// applies `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`
    /// and `AZURE_SUBSCRIPTION_ID` on top.
    pub fn from_env() -> Result<Self, AzureError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AzureError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = match var(AUTH_LOCATION_ENV) {
            Some(path) => Self::from_auth_file(path)?,
            None => Self::default(),
        };
        if let Some(tenant_id) = var("AZURE_TENANT_ID") {
            config.tenant_id = Some(tenant_id);
        }
        if let Some(client_id) = var("AZURE_CLIENT_ID") {
            config.client_id = Some(client_id);
        }
        if let Some(secret) = var("AZURE_CLIENT_SECRET") {
            config.client_credential = Some(secret);
        }
        if let Some(subscription_id) = var("AZURE_SUBSCRIPTION_ID") {
            config.subscription_id = Some(subscription_id);
        }
        Ok(config)
    }

    /// Overlay the fields set in `other` onto `self`.
    #[must_use]
    pub fn merged_with(mut self, other: Self) -> Self {
        self.tenant_id = other.tenant_id.or(self.tenant_id);
        self.client_id = other.client_id.or(self.client_id);
        self.client_credential = other.client_credential.or(self.client_credential);
        self.subscription_id = other.subscription_id.or(self.subscription_id);
        self.resource_group = other.resource_group.or(self.resource_group);
        self.endpoint_url = other.endpoint_url.or(self.endpoint_url);
        if other.location != DEFAULT_REGION {
            self.location = other.location;
        }
        self
    }

    /// Set the Azure AD tenant ID.
    #[must_use]
    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Set the Azure AD application (client) ID.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the Azure AD client credential.
    #[must_use]
    pub fn with_client_credential(mut self, client_credential: impl Into<String>) -> Self {
        self.client_credential = Some(client_credential.into());
        self
    }

    /// Set the Azure subscription ID.
    #[must_use]
    pub fn with_subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    /// Set the default resource group name.
    #[must_use]
    pub fn with_resource_group(mut self, resource_group: impl Into<String>) -> Self {
        self.resource_group = Some(resource_group.into());
        self
    }

    /// Set the region.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the Resource Manager endpoint override.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Resource Manager endpoint to talk to.
    pub fn management_endpoint(&self) -> &str {
        self.endpoint_url
            .as_deref()
            .unwrap_or(DEFAULT_MANAGEMENT_ENDPOINT)
    }

    /// Returns `true` if a full service principal is configured.
    pub fn has_service_principal(&self) -> bool {
        self.tenant_id.is_some() && self.client_id.is_some() && self.client_credential.is_some()
    }
}

impl Default for AzureBaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}
