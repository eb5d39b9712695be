//! Backfill records and their status state machine.
//!
//! A record is one unit of pending-or-completed backfill work, keyed by its
//! alert (1:1). The record stores the work context — the list of data points
//! whose jobs should be re-triggered — as raw JSON, the way the selection step
//! handed it over. The orchestrator drives the record through its terminal
//! outcome and leaves a structured log entry of the last action taken.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::{AlertId, JobId, SummaryId};

/// Outcome text for a fully backfilled record.
pub const OUTCOME_ALL_BACKFILLED: &str = "Backfilled all data points";
/// Outcome text when no data point could be triggered.
pub const OUTCOME_ALL_FAILED: &str =
    "Backfill attempts on all data points failed right upon request.";
/// Outcome text when only some data points could be triggered.
pub const OUTCOME_SOME_FAILED: &str =
    "Backfill attempts on some data points failed right upon request.";

/// Lifecycle status of a backfill record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// Created by the selection step, not yet eligible.
    Preliminary,
    /// Eligible for the next sheriffing pass.
    ReadyForProcessing,
    /// Every data point was successfully triggered.
    Backfilled,
    /// Malformed context, or not every data point could be triggered.
    /// Partially backfilled records land here too; they are not retried.
    Failed,
    /// All triggered jobs have completed and been accounted for.
    Finished,
}

impl RecordStatus {
    /// Returns true if this is a terminal outcome for one sheriffing pass.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Backfilled | Self::Failed | Self::Finished)
    }

    /// Returns true if the transition from self to target is valid.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        match self {
            Self::Preliminary => matches!(target, Self::ReadyForProcessing),
            Self::ReadyForProcessing => matches!(target, Self::Backfilled | Self::Failed),
            Self::Backfilled | Self::Failed => matches!(target, Self::Finished),
            Self::Finished => false,
        }
    }
}

impl Default for RecordStatus {
    fn default() -> Self {
        Self::Preliminary
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preliminary => write!(f, "PRELIMINARY"),
            Self::ReadyForProcessing => write!(f, "READY_FOR_PROCESSING"),
            Self::Backfilled => write!(f, "BACKFILLED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Finished => write!(f, "FINISHED"),
        }
    }
}

/// One job identified as needing a backfill attempt.
///
/// The selection step occasionally stores a point without a job id. Such a
/// point decodes fine and fails individually inside the backfill loop; it
/// never poisons the whole context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    /// The job to re-trigger, if the point carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
}

/// Structured log of the last action taken on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDetails {
    /// The action taken (currently always "BACKFILL").
    pub action: String,
    /// Human-readable outcome of the action.
    pub outcome: String,
}

/// One unit of pending/attempted backfill work, one per alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillRecord {
    /// Identity, shared with the record's alert.
    pub alert_id: AlertId,
    /// The summary whose report owns this record.
    pub summary_id: SummaryId,
    /// Work context: a JSON array of data points, as stored.
    pub context: String,
    /// Current lifecycle status.
    pub status: RecordStatus,
    /// How many backfills were actually triggered.
    pub total_backfills_triggered: u32,
    /// JSON dump of the last action's [`LogDetails`].
    pub log_details: String,
    /// Kind label of the triggered jobs, captured on first success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_kind: Option<String>,
    /// When the record was created.
    pub created: DateTime<Utc>,
}

impl BackfillRecord {
    /// Creates a preliminary record for the given alert.
    #[must_use]
    pub fn new(alert_id: AlertId, summary_id: SummaryId, context: impl Into<String>) -> Self {
        Self {
            alert_id,
            summary_id,
            context: context.into(),
            status: RecordStatus::Preliminary,
            total_backfills_triggered: 0,
            log_details: String::new(),
            job_kind: None,
            created: Utc::now(),
        }
    }

    /// Decodes the stored work context.
    ///
    /// Decoding is permissive about the points themselves: a point missing
    /// its job id still decodes (with [`DataPoint::job_id`] unset) so the
    /// remaining points can be processed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Serialization`] if the stored JSON is
    /// malformed — the caller treats that as a terminal, non-retryable
    /// failure for this pass.
    pub fn get_context(&self) -> Result<Vec<DataPoint>> {
        Ok(serde_json::from_str(&self.context)?)
    }

    /// Replaces the stored work context.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the points cannot be encoded.
    pub fn set_context(&mut self, points: &[DataPoint]) -> Result<()> {
        self.context = serde_json::to_string(points)?;
        Ok(())
    }

    /// Records the structured log of the last action taken.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the details cannot be encoded.
    pub fn set_log_details(&mut self, details: &LogDetails) -> Result<()> {
        self.log_details = serde_json::to_string(details)?;
        Ok(())
    }

    /// Classifies the backfill outcome and writes it onto the record.
    ///
    /// `to_backfill` is the number of data points in the context,
    /// `actually_backfilled` how many were successfully triggered. Returns
    /// `(success, outcome_text)`.
    ///
    /// # Panics
    ///
    /// Panics if `actually_backfilled > to_backfill`. That is a logic bug in
    /// the caller, not an operational condition; it must surface, never be
    /// clamped.
    pub fn note_backfill_outcome(
        &mut self,
        to_backfill: usize,
        actually_backfilled: u32,
    ) -> Result<(bool, &'static str)> {
        assert!(
            (actually_backfilled as usize) <= to_backfill,
            "cannot have backfilled more than available attempts ({actually_backfilled} out of {to_backfill})",
        );

        self.total_backfills_triggered = actually_backfilled;

        let (success, outcome) = if actually_backfilled as usize == to_backfill {
            self.status = RecordStatus::Backfilled;
            (true, OUTCOME_ALL_BACKFILLED)
        } else if actually_backfilled == 0 {
            self.status = RecordStatus::Failed;
            (false, OUTCOME_ALL_FAILED)
        } else {
            self.status = RecordStatus::Failed;
            (false, OUTCOME_SOME_FAILED)
        };

        self.set_log_details(&LogDetails {
            action: "BACKFILL".into(),
            outcome: outcome.into(),
        })?;

        Ok((success, outcome))
    }
}
