//! Pluggable storage for sheriffing state.
//!
//! The [`SheriffStore`] trait defines the persistence layer for alerts,
//! summaries, records and reports.
//!
//! ## Design Principles
//!
//! - **Explicit post-write hooks**: saving an alert recomputes the status of
//!   every summary it counts towards; saving or deleting a record touches its
//!   report's last-updated marker. Implementations run these steps inside the
//!   write path — callers never have to remember them, and no hidden cascade
//!   does them behind the scenes.
//! - **Stable candidate ordering**: [`SheriffStore::ready_records`] returns
//!   the same order on re-fetch within a run (ascending alert ID), so an
//!   abort-on-budget processes a deterministic prefix.
//! - **Testability**: in-memory implementation for tests, a database-backed
//!   one for production.

pub mod memory;

use async_trait::async_trait;

use crate::alert::PerformanceAlert;
use crate::error::Result;
use crate::ids::{AlertId, SummaryId};
use crate::record::BackfillRecord;
use crate::report::BackfillReport;
use crate::summary::AlertSummary;

/// Storage abstraction for sheriffing state.
///
/// ## Thread Safety
///
/// All methods are `Send + Sync`; the engine itself issues at most one call
/// at a time.
#[async_trait]
pub trait SheriffStore: Send + Sync {
    // --- Alert Operations ---

    /// Gets an alert by ID.
    ///
    /// Returns `None` if the alert does not exist.
    async fn get_alert(&self, alert_id: AlertId) -> Result<Option<PerformanceAlert>>;

    /// Saves an alert (insert or update).
    ///
    /// Validates the related-summary/status invariant first, persists the
    /// alert, then recomputes the derived status of the alert's summary and,
    /// if set, of its related summary.
    async fn save_alert(&self, alert: &PerformanceAlert) -> Result<()>;

    // --- Summary Operations ---

    /// Gets a summary by ID.
    async fn get_summary(&self, summary_id: SummaryId) -> Result<Option<AlertSummary>>;

    /// Saves a summary (insert or update).
    async fn save_summary(&self, summary: &AlertSummary) -> Result<()>;

    // --- Record Operations ---

    /// Gets a backfill record by its alert's ID.
    async fn get_record(&self, alert_id: AlertId) -> Result<Option<BackfillRecord>>;

    /// Saves a record (insert or update) and touches its report.
    ///
    /// An update whose status change is not a valid lifecycle step fails
    /// with [`crate::error::Error::InvalidStatusTransition`].
    async fn save_record(&self, record: &BackfillRecord) -> Result<()>;

    /// Deletes a record and touches its report.
    ///
    /// Deleting an unknown record is a no-op.
    async fn delete_record(&self, alert_id: AlertId) -> Result<()>;

    /// Deletes every record under the given summary's report and touches the
    /// report once.
    async fn delete_records_of_report(&self, summary_id: SummaryId) -> Result<()>;

    /// Gets the ready-for-processing records whose alert sits on the given
    /// platform, in ascending alert-ID order.
    async fn ready_records(&self, platform: &str) -> Result<Vec<BackfillRecord>>;

    // --- Report Operations ---

    /// Gets a report by its summary's ID.
    async fn get_report(&self, summary_id: SummaryId) -> Result<Option<BackfillReport>>;

    /// Saves a report (insert or update).
    async fn save_report(&self, report: &BackfillReport) -> Result<()>;
}
