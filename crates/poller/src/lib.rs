//! Readiness polling for remote resources.
//!
//! A [`ReadinessPoller`] repeatedly runs a lookup until the resource it
//! describes exists and satisfies a readiness predicate. Polls can be
//! bounded by attempts or wall-clock time, cancelled through a
//! [`CancellationToken`](tokio_util::sync::CancellationToken), and observed
//! through a single progress channel.
//!
//! ```no_run
//! use std::time::Duration;
//! use aci_poller::{PollConfig, ReadinessPoller, Retryable};
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("lookup failed")]
//! struct LookupError;
//!
//! impl Retryable for LookupError {
//!     fn is_retryable(&self) -> bool {
//!         false
//!     }
//! }
//!
//! async fn find_state() -> Result<Option<String>, LookupError> {
//!     Ok(Some("Running".to_owned()))
//! }
//!
//! # async fn example() -> Result<(), aci_poller::PollError<LookupError>> {
//! let poller = ReadinessPoller::new(
//!     PollConfig::fixed(Duration::from_secs(1)).with_timeout(Duration::from_secs(600)),
//! );
//! let polled = poller
//!     .wait_for("rg/aci-demo", find_state, |state| state == "Running")
//!     .await?;
//! println!("ready after {} checks", polled.attempts);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod poller;
mod progress;
mod retry;

pub use config::PollConfig;
pub use error::{PollError, Retryable};
pub use poller::{Polled, Probe, ReadinessPoller};
pub use progress::{
    Observation, PollProgress, ProgressReceiver, ProgressSender, progress_channel,
};
pub use retry::{DEFAULT_POLL_INTERVAL, RetryStrategy};

pub use tokio_util::sync::CancellationToken;
