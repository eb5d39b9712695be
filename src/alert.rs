//! Performance alerts.
//!
//! An alert is a single detected statistically significant change in one
//! performance series. Every alert belongs to a summary; an alert may in
//! addition point at a *related* summary when its triage outcome moved it
//! elsewhere (downstream or reassigned).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::{AlertId, SummaryId};

/// Triage status of a single alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    /// Not yet looked at by anyone.
    Untriaged,
    /// Caused by a change upstream; tracked on another summary.
    Downstream,
    /// Moved to a different (revised) summary.
    Reassigned,
    /// Not a real change (noise, bad data).
    Invalid,
    /// Confirmed as a real change on this summary.
    Acknowledged,
}

impl AlertStatus {
    /// Returns true for statuses that relate the alert to another summary.
    #[must_use]
    pub const fn is_relational(&self) -> bool {
        matches!(self, Self::Downstream | Self::Reassigned)
    }
}

impl Default for AlertStatus {
    fn default() -> Self {
        Self::Untriaged
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Untriaged => write!(f, "UNTRIAGED"),
            Self::Downstream => write!(f, "DOWNSTREAM"),
            Self::Reassigned => write!(f, "REASSIGNED"),
            Self::Invalid => write!(f, "INVALID"),
            Self::Acknowledged => write!(f, "ACKNOWLEDGED"),
        }
    }
}

/// A single performance alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAlert {
    /// Unique alert identifier.
    pub id: AlertId,
    /// The summary this alert was originally assigned to.
    pub summary_id: SummaryId,
    /// The summary this alert was moved to, if its status relates it there.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_summary_id: Option<SummaryId>,
    /// Platform key of the series signature (e.g. "linux1804-64-shippable").
    pub platform: String,
    /// Current triage status.
    pub status: AlertStatus,
    /// True if the series got worse, false for an improvement.
    pub is_regression: bool,
    /// When the alert was detected.
    pub created: DateTime<Utc>,
}

impl PerformanceAlert {
    /// Creates an untriaged regression alert on the given summary.
    #[must_use]
    pub fn new(id: AlertId, summary_id: SummaryId, platform: impl Into<String>) -> Self {
        Self {
            id,
            summary_id,
            related_summary_id: None,
            platform: platform.into(),
            status: AlertStatus::Untriaged,
            is_regression: true,
            created: Utc::now(),
        }
    }

    /// Validates the status against the related-summary relation.
    ///
    /// An alert with a related summary must carry a relational status
    /// (downstream or reassigned); an alert without one must not. Every save
    /// goes through this check before anything is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] describing the violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.related_summary_id.is_some() && !self.status.is_relational() {
            return Err(Error::validation(format!(
                "related summary set but status {} is not one of DOWNSTREAM, REASSIGNED",
                self.status
            )));
        }
        if self.related_summary_id.is_none() && self.status.is_relational() {
            return Err(Error::validation(format!(
                "related summary not set but status {} is not one of UNTRIAGED, INVALID, ACKNOWLEDGED",
                self.status
            )));
        }
        Ok(())
    }

    /// Returns true if the alert's platform matches the given platform key.
    ///
    /// Matching is a case-insensitive substring test, so a target of "linux"
    /// covers every linux flavour the signature encodes.
    #[must_use]
    pub fn on_platform(&self, platform: &str) -> bool {
        self.platform
            .to_lowercase()
            .contains(&platform.to_lowercase())
    }
}
