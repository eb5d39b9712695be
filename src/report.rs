//! Backfill reports.
//!
//! A report groups the backfill records materialized for one alert summary.
//! The engine never creates or deletes reports (that is the selection step's
//! business), but every record write must refresh its report's last-updated
//! marker, so the type lives here with the touch contract spelled out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SummaryId;

/// Groups and timestamps the backfill records of one alert summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    /// The summary this report belongs to (also its identity).
    pub summary_id: SummaryId,
    /// When the report was created.
    pub created: DateTime<Utc>,
    /// When the report or any of its records was last written.
    pub last_updated: DateTime<Utc>,
    /// Frozen reports are excluded from re-selection.
    pub frozen: bool,
}

impl BackfillReport {
    /// Creates a fresh report for the given summary.
    #[must_use]
    pub fn new(summary_id: SummaryId) -> Self {
        let now = Utc::now();
        Self {
            summary_id,
            created: now,
            last_updated: now,
            frozen: false,
        }
    }

    /// Refreshes the last-updated marker.
    ///
    /// The store calls this after every record save or delete under this
    /// report — it is an explicit post-write hook, not persistence magic.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Returns true if the summary was updated after this report was made.
    #[must_use]
    pub fn is_outdated(&self, summary_last_updated: DateTime<Utc>) -> bool {
        summary_last_updated > self.last_updated
    }
}
