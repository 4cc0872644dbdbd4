use thiserror::Error;

/// Errors raised while building or validating resource definitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A container group definition failed validation.
    #[error("invalid container group definition: {0}")]
    InvalidDefinition(String),

    /// A resource name does not satisfy the provider's naming rules.
    #[error("invalid resource name '{name}': {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An ARM resource id could not be parsed.
    #[error("malformed resource id: {0}")]
    MalformedId(String),
}
