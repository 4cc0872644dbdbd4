use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::error::{PollError, Retryable};
use crate::progress::{Observation, PollProgress, ProgressSender};

/// Result of one readiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// The resource is not visible.
    Absent,
    /// The resource exists but is not ready.
    NotReady(T),
    /// The resource is ready.
    Ready(T),
}

impl<T> Probe<T> {
    /// Build a probe from a lookup result and a readiness predicate.
    pub fn from_lookup(found: Option<T>, is_ready: impl FnOnce(&T) -> bool) -> Self {
        match found {
            None => Self::Absent,
            Some(value) if is_ready(&value) => Self::Ready(value),
            Some(value) => Self::NotReady(value),
        }
    }
}

/// A resource that became ready, with how long it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Polled<T> {
    /// The first value that satisfied the readiness predicate.
    pub value: T,
    /// Checks made, including the successful one.
    pub attempts: u32,
    /// Time from the first check to the successful one.
    pub elapsed: Duration,
}

impl<T> Polled<T> {
    /// Number of sleeps taken before the resource was ready.
    pub fn sleeps(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

/// Repeatedly checks a resource until it is ready.
///
/// The first check runs immediately. Between checks the poller sleeps as
/// prescribed by the configured [`RetryStrategy`](crate::RetryStrategy).
/// Transient lookup errors (see [`Retryable`]) are treated like an absent
/// resource; permanent errors end the poll.
///
/// Without limits, a cancellation token, or an outer timeout, a poll for a
/// resource that never becomes ready does not return.
#[derive(Debug, Clone, Default)]
pub struct ReadinessPoller {
    config: PollConfig,
    cancel: Option<CancellationToken>,
    progress: Option<ProgressSender>,
}

impl ReadinessPoller {
    /// Create a poller from the given configuration.
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            cancel: None,
            progress: None,
        }
    }

    /// Stop polling when `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Report every check on `sender`.
    #[must_use]
    pub fn with_progress(mut self, sender: ProgressSender) -> Self {
        self.progress = Some(sender);
        self
    }

    /// The poller's configuration.
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll `find` until it returns a value satisfying `is_ready`.
    ///
    /// `find` returning `Ok(None)` means the resource is not visible yet.
    pub async fn wait_for<T, E, F, Fut, P>(
        &self,
        resource: &str,
        mut find: F,
        is_ready: P,
    ) -> Result<Polled<T>, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
        P: Fn(&T) -> bool,
        E: std::error::Error + Retryable + 'static,
    {
        self.poll(resource, || {
            let lookup = find();
            let is_ready = &is_ready;
            async move { lookup.await.map(|found| Probe::from_lookup(found, is_ready)) }
        })
        .await
    }

    /// Poll `check` until it reports [`Probe::Ready`].
    pub async fn poll<T, E, F, Fut>(
        &self,
        resource: &str,
        mut check: F,
    ) -> Result<Polled<T>, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Probe<T>, E>>,
        E: std::error::Error + Retryable + 'static,
    {
        let started = Instant::now();
        let deadline = self.config.timeout.map(|timeout| started + timeout);
        let mut attempt: u32 = 0;

        loop {
            if self.is_cancelled() {
                return Err(PollError::Cancelled {
                    resource: resource.to_owned(),
                    attempts: attempt,
                });
            }

            attempt += 1;
            debug!(resource, attempt, "checking readiness");

            let outcome = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, check())
                    .await
                    .map_err(|_| PollError::TimedOut {
                        resource: resource.to_owned(),
                        attempts: attempt,
                        elapsed: started.elapsed(),
                    })?,
                None => check().await,
            };

            let observation = match outcome {
                Ok(Probe::Ready(value)) => {
                    let elapsed = started.elapsed();
                    self.report(resource, attempt, elapsed, Observation::Ready);
                    info!(resource, attempt, elapsed_ms = %elapsed.as_millis(), "resource ready");
                    return Ok(Polled {
                        value,
                        attempts: attempt,
                        elapsed,
                    });
                }
                Ok(Probe::Absent) => Observation::Absent,
                Ok(Probe::NotReady(_)) => Observation::NotReady,
                Err(err) if err.is_retryable() => {
                    warn!(resource, attempt, error = %err, "transient lookup error, will retry");
                    Observation::TransientError(err.to_string())
                }
                Err(err) => {
                    warn!(resource, attempt, error = %err, "lookup failed");
                    return Err(PollError::Lookup {
                        resource: resource.to_owned(),
                        source: err,
                    });
                }
            };
            self.report(resource, attempt, started.elapsed(), observation);

            if self.config.max_attempts.is_some_and(|max| attempt >= max) {
                warn!(resource, attempt, "attempt limit reached");
                return Err(PollError::AttemptsExhausted {
                    resource: resource.to_owned(),
                    attempts: attempt,
                });
            }

            let delay = self.config.strategy.delay_for(attempt - 1);
            debug!(resource, attempt, delay_ms = %delay.as_millis(), "not ready, sleeping");

            tokio::select! {
                biased;
                () = cancelled(self.cancel.as_ref()) => {
                    return Err(PollError::Cancelled {
                        resource: resource.to_owned(),
                        attempts: attempt,
                    });
                }
                () = tokio::time::sleep(delay) => {}
                () = deadline_reached(deadline) => {
                    return Err(PollError::TimedOut {
                        resource: resource.to_owned(),
                        attempts: attempt,
                        elapsed: started.elapsed(),
                    });
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    fn report(&self, resource: &str, attempt: u32, elapsed: Duration, observation: Observation) {
        if let Some(sender) = &self.progress {
            // A dropped receiver only means nobody is watching.
            let _ = sender.send(PollProgress {
                resource: resource.to_owned(),
                attempt,
                elapsed,
                observation,
            });
        }
    }
}

/// Resolve when `token` is cancelled, or never without a token.
async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Resolve at `deadline`, or never without one.
async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
