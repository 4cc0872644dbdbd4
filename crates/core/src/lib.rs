//! Core types for the Azure Container Instances walkthrough.
//!
//! Everything here is provider-agnostic: resource handles, lifecycle
//! states, container-group definitions, resource naming, and the parsing
//! rules for console confirmations. The Azure collaborator and the CLI both
//! build on these types.

pub mod confirm;
pub mod definition;
pub mod error;
pub mod naming;
pub mod resource;
pub mod state;

pub use confirm::parse_confirmation;
pub use definition::{
    ContainerDefinition, ContainerGroupDefinition, DEFAULT_REGION, OsType, PortProtocol,
    ResourceGroupDefinition, RestartPolicy,
};
pub use error::CoreError;
pub use naming::random_resource_name;
pub use resource::{ContainerGroup, ContainerSummary, ResourceGroup, ResourceId};
pub use state::{LifecycleState, ProvisioningState};
