use std::time::Duration;

use thiserror::Error;

/// Classifies lookup errors as transient or permanent.
///
/// Transient errors (throttling, dropped connections, server-side hiccups)
/// are observed and polled through; permanent ones abort the poll.
pub trait Retryable {
    /// Returns `true` if repeating the lookup may succeed.
    fn is_retryable(&self) -> bool;
}

/// Why a poll ended without a ready resource.
#[derive(Debug, Error)]
pub enum PollError<E: std::error::Error + 'static> {
    /// The configured timeout elapsed.
    #[error("timed out after {elapsed:?} waiting for {resource} ({attempts} attempts)")]
    TimedOut {
        /// What was being waited for.
        resource: String,
        /// Checks made before giving up.
        attempts: u32,
        /// Time spent polling.
        elapsed: Duration,
    },

    /// The configured attempt limit was reached.
    #[error("gave up waiting for {resource} after {attempts} attempts")]
    AttemptsExhausted {
        /// What was being waited for.
        resource: String,
        /// Checks made before giving up.
        attempts: u32,
    },

    /// The poll was cancelled through its cancellation token.
    #[error("wait for {resource} cancelled after {attempts} attempts")]
    Cancelled {
        /// What was being waited for.
        resource: String,
        /// Checks made before cancellation.
        attempts: u32,
    },

    /// A lookup failed with a non-retryable error.
    #[error("lookup of {resource} failed")]
    Lookup {
        /// What was being waited for.
        resource: String,
        /// The lookup error.
        #[source]
        source: E,
    },
}

impl<E: std::error::Error + 'static> PollError<E> {
    /// Number of checks made, if the poll got far enough to count them.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::TimedOut { attempts, .. }
            | Self::AttemptsExhausted { attempts, .. }
            | Self::Cancelled { attempts, .. } => Some(*attempts),
            Self::Lookup { .. } => None,
        }
    }

    /// Returns `true` if the poll hit its timeout or attempt limit.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::TimedOut { .. } | Self::AttemptsExhausted { .. })
    }

    /// The underlying lookup error, if that is what ended the poll.
    pub fn lookup_error(&self) -> Option<&E> {
        match self {
            Self::Lookup { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn display_and_accessors() {
        let err: PollError<Boom> = PollError::TimedOut {
            resource: "rg/cg".into(),
            attempts: 4,
            elapsed: Duration::from_secs(3),
        };
        assert_eq!(
            err.to_string(),
            "timed out after 3s waiting for rg/cg (4 attempts)"
        );
        assert_eq!(err.attempts(), Some(4));
        assert!(err.is_exhausted());

        let err: PollError<Boom> = PollError::Cancelled {
            resource: "rg/cg".into(),
            attempts: 2,
        };
        assert!(!err.is_exhausted());
        assert_eq!(err.attempts(), Some(2));
    }

    #[test]
    fn lookup_keeps_source() {
        let err = PollError::Lookup {
            resource: "rg/cg".into(),
            source: Boom,
        };
        assert_eq!(err.to_string(), "lookup of rg/cg failed");
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("boom"));
        assert!(err.lookup_error().is_some());
        assert!(err.attempts().is_none());
    }
}
