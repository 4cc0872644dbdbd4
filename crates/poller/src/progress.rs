use std::time::Duration;

use tokio::sync::mpsc;

/// What a single readiness check saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The resource does not exist (yet).
    Absent,
    /// The resource exists but the readiness predicate does not hold.
    NotReady,
    /// The readiness predicate holds; this is the last event of the poll.
    Ready,
    /// The lookup failed with a transient error.
    TransientError(String),
}

/// One progress event, emitted after every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollProgress {
    /// What is being waited for.
    pub resource: String,
    /// One-based check number.
    pub attempt: u32,
    /// Time since the poll started.
    pub elapsed: Duration,
    /// What the check saw.
    pub observation: Observation,
}

/// Sending half of a progress channel.
pub type ProgressSender = mpsc::UnboundedSender<PollProgress>;

/// Receiving half of a progress channel.
pub type ProgressReceiver = mpsc::UnboundedReceiver<PollProgress>;

/// Create a progress channel.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}
