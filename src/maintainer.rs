//! Report maintenance collaborator.
//!
//! The report maintainer decides which alerts are worth backfilling and
//! materializes or refreshes their reports and records. Its selection
//! heuristics live outside this engine; the orchestrator only asks it to run
//! once per pass, before the backfill loop.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Trait for refreshing backfill-worthy reports.
#[async_trait]
pub trait ReportMaintainer: Send + Sync {
    /// Selects and updates reports for alerts detected since the given
    /// timestamp, restricted to the given frameworks and repositories.
    ///
    /// May create preliminary records or promote them to ready-for-processing
    /// as a side effect. Returns how many reports were affected.
    async fn provide_updated_reports(
        &self,
        since: DateTime<Utc>,
        frameworks: &[String],
        repositories: &[String],
    ) -> Result<usize>;
}

/// A maintainer for testing that never changes anything.
#[derive(Debug, Default)]
pub struct NoOpMaintainer;

#[async_trait]
impl ReportMaintainer for NoOpMaintainer {
    async fn provide_updated_reports(
        &self,
        _since: DateTime<Utc>,
        _frameworks: &[String],
        _repositories: &[String],
    ) -> Result<usize> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_maintainer_reports_nothing() {
        let maintainer = NoOpMaintainer;
        let affected = maintainer
            .provide_updated_reports(Utc::now(), &[], &[])
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }
}
