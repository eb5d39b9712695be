//! In-memory store implementation for testing.
//!
//! This module provides [`InMemoryStore`], a simple in-memory implementation
//! of the [`SheriffStore`] trait suitable for testing and development.
//!
//! ## Limitations
//!
//! - **NOT suitable for production**: No persistence, no cross-process
//!   coordination
//! - **Single-process only**: State is not shared across process boundaries

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::SheriffStore;
use crate::alert::PerformanceAlert;
use crate::error::{Error, Result};
use crate::ids::{AlertId, SummaryId};
use crate::record::{BackfillRecord, RecordStatus};
use crate::report::BackfillReport;
use crate::summary::{derive_status, AlertSummary};

#[derive(Debug, Default)]
struct Inner {
    alerts: HashMap<AlertId, PerformanceAlert>,
    summaries: HashMap<SummaryId, AlertSummary>,
    records: HashMap<AlertId, BackfillRecord>,
    reports: HashMap<SummaryId, BackfillReport>,
}

impl Inner {
    /// All alerts counting towards a summary: its own plus related ones.
    fn alerts_of_summary(&self, summary_id: SummaryId) -> Vec<PerformanceAlert> {
        self.alerts
            .values()
            .filter(|a| a.summary_id == summary_id || a.related_summary_id == Some(summary_id))
            .cloned()
            .collect()
    }

    fn recompute_summary_status(&mut self, summary_id: SummaryId) {
        let alerts = self.alerts_of_summary(summary_id);
        if let Some(summary) = self.summaries.get_mut(&summary_id) {
            summary.status = derive_status(summary.status, &alerts);
            summary.last_updated = chrono::Utc::now();
        }
    }

    fn touch_report(&mut self, summary_id: SummaryId) {
        if let Some(report) = self.reports.get_mut(&summary_id) {
            report.touch();
        }
    }
}

/// In-memory store for testing.
///
/// Provides a simple, thread-safe implementation of the [`SheriffStore`]
/// trait using `RwLock` for synchronization. The post-write hooks (summary
/// recompute, report touch) run under the same lock as the write itself.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

/// Converts a lock poison error to a storage error.
fn poison_err<T>(_: PoisonError<T>) -> Error {
    Error::storage("store lock poisoned")
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records currently held.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn record_count(&self) -> Result<usize> {
        let inner = self.inner.read().map_err(poison_err)?;
        Ok(inner.records.len())
    }
}

#[async_trait]
impl SheriffStore for InMemoryStore {
    async fn get_alert(&self, alert_id: AlertId) -> Result<Option<PerformanceAlert>> {
        let inner = self.inner.read().map_err(poison_err)?;
        Ok(inner.alerts.get(&alert_id).cloned())
    }

    async fn save_alert(&self, alert: &PerformanceAlert) -> Result<()> {
        alert.validate()?;
        let mut inner = self.inner.write().map_err(poison_err)?;
        inner.alerts.insert(alert.id, alert.clone());
        inner.recompute_summary_status(alert.summary_id);
        if let Some(related) = alert.related_summary_id {
            inner.recompute_summary_status(related);
        }
        Ok(())
    }

    async fn get_summary(&self, summary_id: SummaryId) -> Result<Option<AlertSummary>> {
        let inner = self.inner.read().map_err(poison_err)?;
        Ok(inner.summaries.get(&summary_id).cloned())
    }

    async fn save_summary(&self, summary: &AlertSummary) -> Result<()> {
        let mut inner = self.inner.write().map_err(poison_err)?;
        inner.summaries.insert(summary.id, summary.clone());
        Ok(())
    }

    async fn get_record(&self, alert_id: AlertId) -> Result<Option<BackfillRecord>> {
        let inner = self.inner.read().map_err(poison_err)?;
        Ok(inner.records.get(&alert_id).cloned())
    }

    async fn save_record(&self, record: &BackfillRecord) -> Result<()> {
        let mut inner = self.inner.write().map_err(poison_err)?;
        if let Some(existing) = inner.records.get(&record.alert_id) {
            if existing.status != record.status && !existing.status.can_transition_to(record.status)
            {
                return Err(Error::InvalidStatusTransition {
                    from: existing.status.to_string(),
                    to: record.status.to_string(),
                    reason: "not a valid record lifecycle step".into(),
                });
            }
        }
        let summary_id = record.summary_id;
        inner.records.insert(record.alert_id, record.clone());
        inner.touch_report(summary_id);
        Ok(())
    }

    async fn delete_record(&self, alert_id: AlertId) -> Result<()> {
        let mut inner = self.inner.write().map_err(poison_err)?;
        if let Some(record) = inner.records.remove(&alert_id) {
            inner.touch_report(record.summary_id);
        }
        Ok(())
    }

    async fn delete_records_of_report(&self, summary_id: SummaryId) -> Result<()> {
        let mut inner = self.inner.write().map_err(poison_err)?;
        inner.records.retain(|_, r| r.summary_id != summary_id);
        inner.touch_report(summary_id);
        Ok(())
    }

    async fn ready_records(&self, platform: &str) -> Result<Vec<BackfillRecord>> {
        let inner = self.inner.read().map_err(poison_err)?;
        let mut ready: Vec<BackfillRecord> = inner
            .records
            .values()
            .filter(|r| r.status == RecordStatus::ReadyForProcessing)
            .filter(|r| {
                inner
                    .alerts
                    .get(&r.alert_id)
                    .is_some_and(|a| a.on_platform(platform))
            })
            .cloned()
            .collect();
        ready.sort_by_key(|r| r.alert_id);
        Ok(ready)
    }

    async fn get_report(&self, summary_id: SummaryId) -> Result<Option<BackfillReport>> {
        let inner = self.inner.read().map_err(poison_err)?;
        Ok(inner.reports.get(&summary_id).cloned())
    }

    async fn save_report(&self, report: &BackfillReport) -> Result<()> {
        let mut inner = self.inner.write().map_err(poison_err)?;
        inner.reports.insert(report.summary_id, report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertStatus;
    use crate::summary::SummaryStatus;

    fn summary(id: u64) -> AlertSummary {
        AlertSummary::new(SummaryId::new(id), "autoland", "raptor")
    }

    fn alert(id: u64, summary_id: u64) -> PerformanceAlert {
        PerformanceAlert::new(AlertId::new(id), SummaryId::new(summary_id), "linux1804-64")
    }

    fn ready_record(alert_id: u64, summary_id: u64) -> BackfillRecord {
        let mut record = BackfillRecord::new(
            AlertId::new(alert_id),
            SummaryId::new(summary_id),
            r#"[{"job_id":1}]"#,
        );
        record.status = RecordStatus::ReadyForProcessing;
        record
    }

    #[tokio::test]
    async fn save_alert_recomputes_summary_status() -> Result<()> {
        let store = InMemoryStore::new();
        store.save_summary(&summary(10)).await?;

        let mut a = alert(1, 10);
        a.status = AlertStatus::Downstream;
        a.related_summary_id = Some(SummaryId::new(11));
        store.save_summary(&summary(11)).await?;
        store.save_alert(&a).await?;

        let s = store.get_summary(SummaryId::new(10)).await?.unwrap();
        assert_eq!(s.status, SummaryStatus::Downstream);
        Ok(())
    }

    #[tokio::test]
    async fn save_alert_recomputes_related_summary_too() -> Result<()> {
        let store = InMemoryStore::new();
        store.save_summary(&summary(10)).await?;
        store.save_summary(&summary(11)).await?;

        let mut a = alert(1, 10);
        a.status = AlertStatus::Reassigned;
        a.related_summary_id = Some(SummaryId::new(11));
        store.save_alert(&a).await?;

        // The related summary counts the reassigned alert among its own.
        let related = store.get_summary(SummaryId::new(11)).await?.unwrap();
        assert_eq!(related.status, SummaryStatus::Reassigned);
        Ok(())
    }

    #[tokio::test]
    async fn save_alert_rejects_invalid_status_combination() -> Result<()> {
        let store = InMemoryStore::new();
        let mut a = alert(1, 10);
        a.status = AlertStatus::Downstream; // no related summary set

        assert!(matches!(
            store.save_alert(&a).await,
            Err(Error::Validation { .. })
        ));
        assert!(store.get_alert(AlertId::new(1)).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn record_writes_touch_report() -> Result<()> {
        let store = InMemoryStore::new();
        let report = BackfillReport::new(SummaryId::new(10));
        let stamped = report.last_updated;
        store.save_report(&report).await?;

        store.save_record(&ready_record(1, 10)).await?;
        let touched = store.get_report(SummaryId::new(10)).await?.unwrap();
        assert!(touched.last_updated >= stamped);

        let after_save = touched.last_updated;
        store.delete_record(AlertId::new(1)).await?;
        let touched = store.get_report(SummaryId::new(10)).await?.unwrap();
        assert!(touched.last_updated >= after_save);
        Ok(())
    }

    #[tokio::test]
    async fn delete_records_of_report_expels_and_touches() -> Result<()> {
        let store = InMemoryStore::new();
        store.save_report(&BackfillReport::new(SummaryId::new(10))).await?;
        store.save_record(&ready_record(1, 10)).await?;
        store.save_record(&ready_record(2, 10)).await?;
        store.save_record(&ready_record(3, 20)).await?;

        store.delete_records_of_report(SummaryId::new(10)).await?;
        assert_eq!(store.record_count()?, 1);
        assert!(store.get_record(AlertId::new(3)).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn save_record_enforces_lifecycle_transitions() -> Result<()> {
        let store = InMemoryStore::new();
        store.save_record(&ready_record(1, 10)).await?;

        // Re-saving at the same status is an ordinary update.
        store.save_record(&ready_record(1, 10)).await?;

        let mut backfilled = ready_record(1, 10);
        backfilled.status = RecordStatus::Backfilled;
        store.save_record(&backfilled).await?;

        let mut regressed = ready_record(1, 10);
        regressed.status = RecordStatus::Preliminary;
        assert!(matches!(
            store.save_record(&regressed).await,
            Err(Error::InvalidStatusTransition { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn ready_records_filters_by_status_and_platform() -> Result<()> {
        let store = InMemoryStore::new();

        store.save_summary(&summary(10)).await?;
        store.save_alert(&alert(1, 10)).await?;
        store.save_alert(&alert(2, 10)).await?;
        let mut windows_alert = alert(3, 10);
        windows_alert.platform = "windows10-64".into();
        store.save_alert(&windows_alert).await?;

        store.save_record(&ready_record(2, 10)).await?;
        store.save_record(&ready_record(1, 10)).await?;
        store.save_record(&ready_record(3, 10)).await?;
        let mut preliminary = ready_record(4, 10);
        preliminary.status = RecordStatus::Preliminary;
        store.save_record(&preliminary).await?;

        let ready = store.ready_records("linux").await?;
        let ids: Vec<u64> = ready.iter().map(|r| r.alert_id.as_u64()).collect();
        assert_eq!(ids, vec![1, 2], "ascending alert-ID order, linux only");
        Ok(())
    }
}
