//! Backfill executor trait and test implementations.
//!
//! The executor is responsible for triggering exactly one re-test of a job on
//! the remote execution service. The call is treated as blocking and
//! network-bound; whatever retrying or timing out it does internally is
//! opaque to the engine.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::ids::JobId;

/// A successfully triggered backfill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredBackfill {
    /// The job that was re-triggered.
    pub job_id: JobId,
    /// Kind label of the job (e.g. "test-linux1804-64/opt-raptor"), used for
    /// grouping in the outcome notification.
    pub job_kind: String,
}

/// Trait for triggering re-test jobs.
///
/// Implementations can talk to a CI execution service or stay entirely local
/// for tests. A failure applies to one data point only; the engine logs it
/// and moves on to the next point.
#[async_trait]
pub trait BackfillExecutor: Send + Sync {
    /// Triggers exactly one backfill for the given job.
    ///
    /// # Errors
    ///
    /// - [`Error::CannotBackfill`] if the service refuses the job
    /// - [`Error::JobNotFound`] if the service does not know the job
    /// - any other error for transport-level failures
    async fn trigger(&self, job_id: JobId) -> Result<TriggeredBackfill>;
}

/// An executor for testing that triggers every job immediately.
#[derive(Debug, Default)]
pub struct NoOpExecutor;

#[async_trait]
impl BackfillExecutor for NoOpExecutor {
    async fn trigger(&self, job_id: JobId) -> Result<TriggeredBackfill> {
        Ok(TriggeredBackfill {
            job_id,
            job_kind: "test-noop".into(),
        })
    }
}

/// An executor that refuses every job with a configurable reason.
#[derive(Debug)]
pub struct FailingExecutor {
    reason: String,
}

impl FailingExecutor {
    /// Creates a new failing executor with the given refusal reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl BackfillExecutor for FailingExecutor {
    async fn trigger(&self, job_id: JobId) -> Result<TriggeredBackfill> {
        Err(Error::CannotBackfill {
            job_id,
            reason: self.reason.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingExecutor {
        count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BackfillExecutor for CountingExecutor {
        async fn trigger(&self, job_id: JobId) -> Result<TriggeredBackfill> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(TriggeredBackfill {
                job_id,
                job_kind: "test-counting".into(),
            })
        }
    }

    #[tokio::test]
    async fn executor_triggers_job() {
        let count = Arc::new(AtomicUsize::new(0));
        let executor = CountingExecutor {
            count: count.clone(),
        };

        let triggered = executor.trigger(JobId::new(7)).await.unwrap();
        assert_eq!(triggered.job_id, JobId::new(7));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn noop_executor_succeeds() {
        let executor = NoOpExecutor;
        assert!(executor.trigger(JobId::new(1)).await.is_ok());
    }

    #[tokio::test]
    async fn failing_executor_refuses() {
        let executor = FailingExecutor::new("queue overloaded");
        let err = executor.trigger(JobId::new(1)).await.unwrap_err();
        assert!(matches!(err, Error::CannotBackfill { .. }));
        assert!(err.to_string().contains("queue overloaded"));
    }
}
