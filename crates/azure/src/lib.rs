//! Azure Resource Manager access for container instances.
//!
//! - [`ArmClient`] talks to the ARM REST API with a bearer token from
//!   `azure_identity`, and implements the [`ResourceGroupDirectory`] and
//!   [`ContainerGroupDirectory`] traits.
//! - [`MemoryCloud`] implements the same traits in memory, with configurable
//!   provisioning delays.
//! - [`wait_for_container_group`], [`wait_until_running`] and
//!   [`wait_for_resource_group_deletion`] drive a
//!   [`ReadinessPoller`](aci_poller::ReadinessPoller) against either.
//!
//! Credentials and the subscription come from [`AzureBaseConfig`], which can
//! be loaded from an SDK auth file (`AZURE_AUTH_LOCATION`) or the
//! environment; [`authenticate`] turns it into a [`Session`].

pub mod arm;
pub mod auth;
pub mod config;
pub mod container_groups;
pub mod directory;
pub mod error;
pub mod memory;
mod model;
pub mod resource_groups;
pub mod wait;

pub use arm::{ArmClient, ArmClientBuilder, MANAGEMENT_SCOPE};
pub use auth::{Session, Subscription, authenticate, authenticate_with, build_azure_credential};
pub use config::{AUTH_LOCATION_ENV, AzureBaseConfig, DEFAULT_MANAGEMENT_ENDPOINT};
pub use directory::{CloudDirectory, ContainerGroupDirectory, ResourceGroupDirectory};
pub use error::{AzureError, classify_azure_error};
pub use memory::MemoryCloud;
pub use wait::{wait_for_container_group, wait_for_resource_group_deletion, wait_until_running};
