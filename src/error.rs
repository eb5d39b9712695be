//! Error types for the sheriffing domain.

use std::time::Duration;

use crate::ids::JobId;

/// The result type used throughout perf-sheriff.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a sheriffing pass.
///
/// Two kinds of failure deliberately stay distinct (never unify them):
///
/// - **Pass-abort conditions** (`MaxRuntimeExceeded`) propagate out of
///   [`crate::sheriff::SheriffBot::sheriff`] and abandon the whole tick.
/// - **Per-unit failures** (executor errors, malformed context) are contained
///   at the record or data-point boundary and become a terminal record status.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The wall-clock budget for the current pass was exhausted.
    #[error("max runtime exceeded: {elapsed:?} elapsed against a budget of {budget:?}")]
    MaxRuntimeExceeded {
        /// Time elapsed since the orchestrator was constructed.
        elapsed: Duration,
        /// The configured maximum runtime.
        budget: Duration,
    },

    /// A backfill could not be triggered for a job.
    #[error("cannot backfill job {job_id}: {reason}")]
    CannotBackfill {
        /// The job that was to be re-triggered.
        job_id: JobId,
        /// Why the executor refused.
        reason: String,
    },

    /// The execution service does not know the requested job.
    #[error("job not found: {job_id}")]
    JobNotFound {
        /// The missing job.
        job_id: JobId,
    },

    /// An invalid record status transition was attempted.
    #[error("invalid status transition: {from} -> {to} ({reason})")]
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The attempted target status.
        to: String,
        /// The reason the transition is invalid.
        reason: String,
    },

    /// A save would violate a domain validation rule.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the violated rule.
        message: String,
    },

    /// A notification field was read before it was set.
    ///
    /// This is a precondition error on the low-level report object; the
    /// orchestrator-facing writer never lets an empty input reach it.
    #[error("programming error: notification {field} has not been set")]
    NotificationFieldUnset {
        /// The field that was read too early ("content" or "address").
        field: &'static str,
    },

    /// A storage operation failed.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A serialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// Outbound mail delivery failed.
    #[error("mail delivery failed: {message}")]
    MailDelivery {
        /// Description of the delivery failure.
        message: String,
    },
}

impl Error {
    /// Creates a new storage error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new storage error with a source.
    #[must_use]
    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns true if this error aborts the whole pass.
    #[must_use]
    pub const fn is_pass_abort(&self) -> bool {
        matches!(self, Self::MaxRuntimeExceeded { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
