use std::sync::Arc;
use std::time::Duration;

use azure_core::credentials::TokenCredential;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{AzureBaseConfig, DEFAULT_MANAGEMENT_ENDPOINT};
use crate::error::AzureError;

/// OAuth scope for Azure Resource Manager tokens.
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Characters escaped in a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'<')
    .add(b'>');

pub(crate) fn segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// HTTP client for the Azure Resource Manager REST API.
///
/// Holds an optional bearer-token credential; without one requests are sent
/// unauthenticated, which is what local emulators and tests expect.
#[derive(Clone)]
pub struct ArmClient {
    http: Client,
    endpoint: String,
    credential: Option<Arc<dyn TokenCredential>>,
    subscription_id: Option<String>,
}

impl std::fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .field("subscription_id", &self.subscription_id)
            .finish_non_exhaustive()
    }
}

/// Builder for configuring an [`ArmClient`].
pub struct ArmClientBuilder {
    endpoint: String,
    timeout: Duration,
    credential: Option<Arc<dyn TokenCredential>>,
    subscription_id: Option<String>,
    client: Option<Client>,
}

impl ArmClientBuilder {
    /// Create a new builder for the given Resource Manager endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_owned(),
            timeout: DEFAULT_TIMEOUT,
            credential: None,
            subscription_id: None,
            client: None,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Authenticate requests with this credential.
    #[must_use]
    pub fn credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Scope resource operations to a subscription.
    #[must_use]
    pub fn subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    /// Use a custom reqwest Client.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<ArmClient, AzureError> {
        let http = match self.client {
            Some(c) => c,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| AzureError::Configuration(e.to_string()))?,
        };

        Ok(ArmClient {
            http,
            endpoint: self.endpoint,
            credential: self.credential,
            subscription_id: self.subscription_id,
        })
    }
}

impl ArmClient {
    /// Create a builder for the given endpoint.
    pub fn builder(endpoint: impl Into<String>) -> ArmClientBuilder {
        ArmClientBuilder::new(endpoint)
    }

    /// Create a builder pointed at the endpoint and subscription in `config`.
    pub fn builder_from_config(config: &AzureBaseConfig) -> ArmClientBuilder {
        let builder = ArmClientBuilder::new(config.management_endpoint());
        match &config.subscription_id {
            Some(id) => builder.subscription_id(id.clone()),
            None => builder,
        }
    }

    /// Resource Manager endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Subscription resource operations are scoped to.
    pub fn subscription_id(&self) -> Option<&str> {
        self.subscription_id.as_deref()
    }

    /// Returns `true` if requests carry a bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Return a copy of this client scoped to `subscription_id`.
    #[must_use]
    pub fn with_subscription(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    /// `/subscriptions/{id}` for the selected subscription.
    pub(crate) fn subscription_scope(&self) -> Result<String, AzureError> {
        self.subscription_id
            .as_deref()
            .map(|id| format!("/subscriptions/{}", segment(id)))
            .ok_or_else(|| AzureError::Configuration("no subscription selected".to_owned()))
    }

    /// Absolute URL for an ARM path.
    pub(crate) fn url(&self, path: &str, api_version: &str) -> String {
        let separator = if path.contains('?') { '&' } else { '?' };
        format!(
            "{}{path}{separator}api-version={api_version}",
            self.endpoint
        )
    }

    async fn authorize(&self, req: RequestBuilder) -> Result<RequestBuilder, AzureError> {
        let Some(credential) = &self.credential else {
            return Ok(req);
        };
        let token = credential
            .get_token(&[MANAGEMENT_SCOPE], None)
            .await
            .map_err(|e| AzureError::CredentialError(e.to_string()))?;
        Ok(req.bearer_auth(token.token.secret()))
    }

    async fn execute(&self, req: RequestBuilder) -> Result<Response, AzureError> {
        let response = self.authorize(req).await?.send().await?;
        debug!(status = response.status().as_u16(), url = %response.url(), "ARM response");
        Ok(response)
    }

    async fn error_from(response: Response) -> AzureError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        AzureError::from_response(status, &body)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AzureError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| AzureError::Deserialization(e.to_string()))
    }

    /// GET a resource. A 404 is `Ok(None)`.
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, AzureError> {
        let response = self.execute(self.http.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Self::decode(response).await.map(Some)
        } else {
            Err(Self::error_from(response).await)
        }
    }

    /// GET a resource that must exist.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AzureError> {
        let response = self.execute(self.http.get(url)).await?;
        if response.status().is_success() {
            Self::decode(response).await
        } else {
            Err(Self::error_from(response).await)
        }
    }

    /// PUT a body and decode the resource ARM returns.
    pub(crate) async fn put_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, AzureError> {
        let response = self.execute(self.http.put(url).json(body)).await?;
        if response.status().is_success() {
            Self::decode(response).await
        } else {
            Err(Self::error_from(response).await)
        }
    }

    /// DELETE a resource. A 404 is [`AzureError::NotFound`].
    pub(crate) async fn delete(&self, url: &str) -> Result<StatusCode, AzureError> {
        let response = self.execute(self.http.delete(url)).await?;
        let status = response.status();
        if status.is_success() {
            Ok(status)
        } else {
            Err(Self::error_from(response).await)
        }
    }
}

impl Default for ArmClient {
    fn default() -> Self {
        Self {
            http: Client::new(),
            endpoint: DEFAULT_MANAGEMENT_ENDPOINT.to_owned(),
            credential: None,
            subscription_id: None,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    /// A captured request: request line and body.
    #[derive(Debug, Clone)]
    pub(crate) struct Captured {
        pub request_line: String,
        pub body: String,
    }

    /// Minimal one-connection-per-response HTTP server.
    pub(crate) struct MockArmServer {
        listener: tokio::net::TcpListener,
        pub base_url: String,
    }

    impl MockArmServer {
        pub(crate) async fn start() -> Self {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind mock server");
            let port = listener.local_addr().unwrap().port();
            let base_url = format!("http://127.0.0.1:{port}");
            Self { listener, base_url }
        }

        pub(crate) fn client(&self) -> ArmClient {
            ArmClient::builder(&self.base_url)
                .subscription_id("sub-123")
                .build()
                .unwrap()
        }

        /// Answer each request in turn with the given status and JSON body.
        pub(crate) async fn respond(self, responses: Vec<(u16, String)>) -> Vec<Captured> {
            let mut captured = Vec::new();
            for (status_code, body) in responses {
                captured.push(self.respond_once(status_code, &body).await);
            }
            captured
        }

        async fn respond_once(&self, status_code: u16, body: &str) -> Captured {
            let (mut stream, _) = self.listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = vec![0u8; 8192];
            let header_end = loop {
                let n = stream.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if let Some(pos) = find_header_end(&request) {
                    break pos;
                }
                assert!(n > 0, "connection closed before headers");
            };
            let head = String::from_utf8_lossy(&request[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            while request.len() < header_end + 4 + content_length {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_code} OK\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();

            Captured {
                request_line: head.lines().next().unwrap_or_default().to_owned(),
                body: String::from_utf8_lossy(&request[header_end + 4..]).to_string(),
            }
        }
    }

    fn find_header_end(request: &[u8]) -> Option<usize> {
        request.windows(4).position(|w| w == b"\r\n\r\n")
    }

    #[test]
    fn builder_trims_endpoint() {
        let client = ArmClient::builder("http://localhost:8080/")
            .subscription_id("sub-1")
            .build()
            .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080");
        assert_eq!(client.subscription_id(), Some("sub-1"));
        assert!(!client.is_authenticated());
    }

    #[test]
    fn builder_from_config_uses_override() {
        let config = AzureBaseConfig::default()
            .with_endpoint_url("http://127.0.0.1:9999")
            .with_subscription_id("sub-cfg");
        let client = ArmClient::builder_from_config(&config).build().unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9999");
        assert_eq!(client.subscription_id(), Some("sub-cfg"));
    }

    #[test]
    fn url_appends_api_version() {
        let client = ArmClient::default().with_subscription("sub-1");
        assert_eq!(
            client.url("/subscriptions", "2022-12-01"),
            "https://management.azure.com/subscriptions?api-version=2022-12-01"
        );
        assert_eq!(
            client.url("/x/logs?tail=10", "2023-05-01"),
            "https://management.azure.com/x/logs?tail=10&api-version=2023-05-01"
        );
    }

    #[test]
    fn subscription_scope_requires_subscription() {
        let err = ArmClient::default().subscription_scope().unwrap_err();
        assert!(matches!(err, AzureError::Configuration(_)));
        let scope = ArmClient::default()
            .with_subscription("sub 1")
            .subscription_scope()
            .unwrap();
        assert_eq!(scope, "/subscriptions/sub%201");
    }

    #[test]
    fn debug_hides_credential() {
        let debug = format!("{:?}", ArmClient::default());
        assert!(debug.contains("ArmClient"));
        assert!(debug.contains("management.azure.com"));
    }

    #[tokio::test]
    async fn get_optional_maps_404_to_none() {
        let server = MockArmServer::start().await;
        let client = server.client();
        let url = client.url("/anything", "2021-04-01");

        let handle = tokio::spawn(server.respond(vec![(
            404,
            r#"{"error":{"code":"ResourceNotFound","message":"gone"}}"#.to_owned(),
        )]));
        let result: Option<serde_json::Value> = client.get_optional(&url).await.unwrap();
        let captured = handle.await.unwrap();

        assert!(result.is_none());
        assert_eq!(
            captured[0].request_line,
            "GET /anything?api-version=2021-04-01 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn server_error_surfaces_envelope() {
        let server = MockArmServer::start().await;
        let client = server.client();
        let url = client.url("/anything", "2021-04-01");

        let handle = tokio::spawn(server.respond(vec![(
            409,
            r#"{"error":{"code":"Conflict","message":"busy"}}"#.to_owned(),
        )]));
        let err = client
            .get_json::<serde_json::Value>(&url)
            .await
            .unwrap_err();
        handle.await.unwrap();

        match err {
            AzureError::ServiceError { status, code, .. } => {
                assert_eq!(status, 409);
                assert_eq!(code, "Conflict");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_deserialization_error() {
        let server = MockArmServer::start().await;
        let client = server.client();
        let url = client.url("/anything", "2021-04-01");

        let handle = tokio::spawn(server.respond(vec![(200, "not json".to_owned())]));
        let err = client
            .get_json::<serde_json::Value>(&url)
            .await
            .unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, AzureError::Deserialization(_)));
    }

    #[tokio::test]
    async fn refused_connection_is_retryable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = ArmClient::builder(format!("http://127.0.0.1:{port}"))
            .build()
            .unwrap();
        let err = client
            .get_json::<serde_json::Value>(&client.url("/x", "2021-04-01"))
            .await
            .unwrap_err();
        assert!(err.is_retryable(), "{err:?}");
    }
}
