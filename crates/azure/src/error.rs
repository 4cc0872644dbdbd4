use aci_core::CoreError;
use aci_poller::Retryable;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned by Azure Resource Manager operations.
#[derive(Debug, Error)]
pub enum AzureError {
    /// ARM answered with a non-success status.
    #[error("Azure service error ({status} {code}): {message}")]
    ServiceError {
        /// HTTP status code.
        status: u16,
        /// ARM error code, e.g. `InvalidResourceGroupLocation`.
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// The addressed resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The request was throttled by the Azure service.
    #[error("Azure request throttled")]
    Throttled,

    /// A network or connection error occurred communicating with Azure.
    #[error("Azure connection error: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("Azure request timed out")]
    Timeout,

    /// Azure credential resolution failed.
    #[error("credential error: {0}")]
    CredentialError(String),

    /// Configuration is invalid.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A response body could not be decoded.
    #[error("failed to decode Azure response: {0}")]
    Deserialization(String),

    /// A definition was rejected before it was sent.
    #[error(transparent)]
    InvalidDefinition(#[from] CoreError),

    /// The resource reached a failed state instead of becoming ready.
    #[error("{resource} failed to provision (state: {state})")]
    ProvisioningFailed {
        /// The resource, as `group/name`.
        resource: String,
        /// The state label that was reported.
        state: String,
    },
}

impl AzureError {
    /// Returns `true` if repeating the request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Throttled | Self::Connection(_) | Self::Timeout => true,
            Self::ServiceError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` for [`AzureError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Build an error from a non-success ARM response.
    ///
    /// The body is decoded as the ARM error envelope
    /// `{"error":{"code":...,"message":...}}` when possible.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error);
        let (code, message) = match detail {
            Some(detail) => (detail.code, detail.message),
            None => (String::new(), body.trim().to_owned()),
        };

        match status {
            404 => Self::NotFound(if message.is_empty() { code } else { message }),
            429 => Self::Throttled,
            408 | 504 => Self::Timeout,
            _ => Self::ServiceError {
                status,
                code,
                message,
            },
        }
    }
}

impl Retryable for AzureError {
    fn is_retryable(&self) -> bool {
        AzureError::is_retryable(self)
    }
}

impl From<reqwest::Error> for AzureError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Deserialization(err.to_string())
        } else if err.is_connect() || err.is_request() {
            Self::Connection(err.to_string())
        } else {
            classify_azure_error(&err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Classify an Azure SDK error string into the appropriate [`AzureError`].
///
/// Inspects the error message for common patterns (throttling, timeout,
/// connection) and maps them to the correct variant.
pub fn classify_azure_error(error_str: &str) -> AzureError {
    let lower = error_str.to_lowercase();
    if lower.contains("429")
        || lower.contains("throttl")
        || lower.contains("rate exceed")
        || lower.contains("too many")
    {
        AzureError::Throttled
    } else if lower.contains("timeout") || lower.contains("timed out") {
        AzureError::Timeout
    } else if lower.contains("connection")
        || lower.contains("connect")
        || lower.contains("dns")
        || lower.contains("network")
    {
        AzureError::Connection(error_str.to_owned())
    } else {
        AzureError::ServiceError {
            status: 0,
            code: String::new(),
            message: error_str.to_owned(),
        }
    }
}
