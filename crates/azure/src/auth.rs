use std::fmt;
use std::sync::Arc;

use azure_core::credentials::{Secret, TokenCredential};
use tracing::{debug, info, instrument};

use crate::arm::{ArmClient, segment};
use crate::config::AzureBaseConfig;
use crate::error::AzureError;
use crate::model::{Page, SubscriptionResource};

/// API version for `Microsoft.Resources/subscriptions`.
pub const SUBSCRIPTIONS_API_VERSION: &str = "2022-12-01";

/// Build an Azure credential from the given [`AzureBaseConfig`].
///
/// If `tenant_id`, `client_id`, and `client_credential` are all present,
/// uses `ClientSecretCredential` for service-principal authentication.
/// Otherwise falls back to `AzureCliCredential` which uses the Azure CLI
/// login context.
///
/// # Errors
///
/// Returns [`AzureError::CredentialError`] if credential construction fails.
pub fn build_azure_credential(
    config: &AzureBaseConfig,
) -> Result<Arc<dyn TokenCredential>, AzureError> {
    if let (Some(tenant_id), Some(client_id), Some(client_cred)) = (
        &config.tenant_id,
        &config.client_id,
        &config.client_credential,
    ) {
        info!("using service-principal credentials for Azure");
        debug!(tenant_id = %tenant_id, "building ClientSecretCredential");

        let credential = azure_identity::ClientSecretCredential::new(
            tenant_id,
            client_id.clone(),
            Secret::new(client_cred.clone()),
            None,
        )
        .map_err(|e| AzureError::CredentialError(e.to_string()))?;

        Ok(credential)
    } else {
        info!("using AzureCliCredential for Azure");
        let credential = azure_identity::AzureCliCredential::new(None)
            .map_err(|e| AzureError::CredentialError(e.to_string()))?;

        Ok(credential)
    }
}

/// A subscription the caller can access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Subscription id.
    pub id: String,
    /// Display name; falls back to the id when ARM reports none.
    pub display_name: String,
}

impl Subscription {
    fn from_resource(resource: SubscriptionResource) -> Self {
        let display_name = resource
            .display_name
            .unwrap_or_else(|| resource.subscription_id.clone());
        Self {
            id: resource.subscription_id,
            display_name,
        }
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (ID: {})", self.display_name, self.id)
    }
}

/// An authenticated client bound to one subscription.
#[derive(Debug, Clone)]
pub struct Session {
    client: ArmClient,
    subscription: Subscription,
}

impl Session {
    /// Bind `client` to `subscription`.
    pub fn new(client: ArmClient, subscription: Subscription) -> Self {
        let client = client.with_subscription(subscription.id.clone());
        Self {
            client,
            subscription,
        }
    }

    /// The selected subscription.
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Client scoped to the selected subscription.
    pub fn client(&self) -> &ArmClient {
        &self.client
    }

    /// Consume the session, keeping the client.
    pub fn into_client(self) -> ArmClient {
        self.client
    }
}

impl ArmClient {
    /// Look up one subscription. `Ok(None)` if it is not accessible.
    pub async fn get_subscription(&self, id: &str) -> Result<Option<Subscription>, AzureError> {
        let url = self.url(
            &format!("/subscriptions/{}", segment(id)),
            SUBSCRIPTIONS_API_VERSION,
        );
        let found: Option<SubscriptionResource> = self.get_optional(&url).await?;
        Ok(found.map(Subscription::from_resource))
    }

    /// List the subscriptions the credential can access.
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>, AzureError> {
        let mut next = Some(self.url("/subscriptions", SUBSCRIPTIONS_API_VERSION));
        let mut subscriptions = Vec::new();
        while let Some(url) = next.take() {
            let page: Page<SubscriptionResource> = self.get_json(&url).await?;
            subscriptions.extend(page.value.into_iter().map(Subscription::from_resource));
            next = page.next_link;
        }
        Ok(subscriptions)
    }

    /// Select `preferred`, or the first accessible subscription.
    pub async fn resolve_subscription(
        &self,
        preferred: Option<&str>,
    ) -> Result<Subscription, AzureError> {
        match preferred {
            Some(id) => self.get_subscription(id).await?.ok_or_else(|| {
                AzureError::CredentialError(format!("subscription {id} is not accessible"))
            }),
            None => self
                .list_subscriptions()
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    AzureError::CredentialError("no accessible subscriptions".to_owned())
                }),
        }
    }
}

/// Authenticate with Azure and select a subscription.
///
/// Resolves a credential with [`build_azure_credential`], then selects the
/// configured subscription or the first one the credential can access.
#[instrument(skip(config))]
pub async fn authenticate(config: &AzureBaseConfig) -> Result<Session, AzureError> {
    let credential = build_azure_credential(config)?;
    let client = ArmClient::builder(config.management_endpoint())
        .credential(credential)
        .build()?;
    authenticate_with(client, config.subscription_id.as_deref()).await
}

/// Select a subscription using an already-built client.
pub async fn authenticate_with(
    client: ArmClient,
    subscription_id: Option<&str>,
) -> Result<Session, AzureError> {
    let subscription = client.resolve_subscription(subscription_id).await?;
    info!(subscription_id = %subscription.id, "authenticated");
    Ok(Session::new(client, subscription))
}
