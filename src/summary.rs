//! Alert summaries and their derived status.
//!
//! A summary aggregates the alerts tied to one push transition. Its status is
//! recomputed from its alerts' statuses on every alert write, but the
//! derivation is *not* memoryless: one branch holds the summary's current
//! status steady (the sticky investigation states). [`derive_status`] therefore
//! takes the previous status explicitly — never refactor it into a pure
//! function of the alerts alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alert::{AlertStatus, PerformanceAlert};
use crate::ids::SummaryId;

/// Triage status of an alert summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryStatus {
    /// At least one alert still needs triage (or there are no alerts yet).
    Untriaged,
    /// Every remaining alert was pushed downstream.
    Downstream,
    /// At least one remaining alert was reassigned elsewhere.
    Reassigned,
    /// Every alert turned out to be invalid.
    Invalid,
    /// All acknowledged alerts are improvements.
    Improvement,
    /// Under active investigation.
    Investigating,
    /// Investigated and deliberately left unfixed.
    Wontfix,
    /// The offending change was fixed.
    Fixed,
    /// The offending change was backed out.
    BackedOut,
}

impl SummaryStatus {
    /// Returns true for statuses that survive recomputation unchanged once an
    /// acknowledged regression is present.
    #[must_use]
    pub const fn is_sticky(&self) -> bool {
        matches!(
            self,
            Self::Improvement | Self::Investigating | Self::Wontfix | Self::Fixed | Self::BackedOut
        )
    }
}

impl Default for SummaryStatus {
    fn default() -> Self {
        Self::Untriaged
    }
}

impl std::fmt::Display for SummaryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Untriaged => write!(f, "UNTRIAGED"),
            Self::Downstream => write!(f, "DOWNSTREAM"),
            Self::Reassigned => write!(f, "REASSIGNED"),
            Self::Invalid => write!(f, "INVALID"),
            Self::Improvement => write!(f, "IMPROVEMENT"),
            Self::Investigating => write!(f, "INVESTIGATING"),
            Self::Wontfix => write!(f, "WONTFIX"),
            Self::Fixed => write!(f, "FIXED"),
            Self::BackedOut => write!(f, "BACKED_OUT"),
        }
    }
}

/// Derives a summary's status from its previous status and its alerts.
///
/// `alerts` must contain the summary's own alerts plus any alerts related to
/// it from other summaries. Precedence order:
///
/// 1. No alerts at all → untriaged.
/// 2. Any untriaged alert → untriaged.
/// 3. All alerts invalid → invalid.
/// 4. Otherwise, invalid alerts are discarded, then:
///    a. any acknowledged alert: improvement if all acknowledged alerts are
///       improvements, else investigating — unless `previous` is already a
///       sticky state, which is kept;
///    b. else any reassigned alert → reassigned;
///    c. else → downstream.
#[must_use]
pub fn derive_status(previous: SummaryStatus, alerts: &[PerformanceAlert]) -> SummaryStatus {
    if alerts.is_empty() {
        return SummaryStatus::Untriaged;
    }

    if alerts.iter().any(|a| a.status == AlertStatus::Untriaged) {
        return SummaryStatus::Untriaged;
    }

    if alerts.iter().all(|a| a.status == AlertStatus::Invalid) {
        return SummaryStatus::Invalid;
    }

    let valid: Vec<&PerformanceAlert> = alerts
        .iter()
        .filter(|a| a.status != AlertStatus::Invalid)
        .collect();

    if valid
        .iter()
        .any(|a| a.status == AlertStatus::Acknowledged)
    {
        if valid
            .iter()
            .filter(|a| a.status == AlertStatus::Acknowledged)
            .all(|a| !a.is_regression)
        {
            return SummaryStatus::Improvement;
        }
        if !previous.is_sticky() {
            return SummaryStatus::Investigating;
        }
        // keep status if one of the investigating ones
        return previous;
    }

    // At this point every remaining alert is reassigned or downstream.
    if valid.iter().any(|a| a.status == AlertStatus::Reassigned) {
        return SummaryStatus::Reassigned;
    }

    SummaryStatus::Downstream
}

/// An aggregation of alerts tied to the same push transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    /// Unique summary identifier.
    pub id: SummaryId,
    /// Repository the push transition belongs to.
    pub repository: String,
    /// Performance framework that produced the alerts.
    pub framework: String,
    /// Derived triage status.
    pub status: SummaryStatus,
    /// When the summary was created.
    pub created: DateTime<Utc>,
    /// When the summary (or one of its alerts) was last written.
    pub last_updated: DateTime<Utc>,
}

impl AlertSummary {
    /// Creates an untriaged summary.
    #[must_use]
    pub fn new(id: SummaryId, repository: impl Into<String>, framework: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            repository: repository.into(),
            framework: framework.into(),
            status: SummaryStatus::Untriaged,
            created: now,
            last_updated: now,
        }
    }

    /// Recomputes the status from the given alert set and refreshes the
    /// last-updated marker.
    pub fn update_status(&mut self, alerts: &[PerformanceAlert]) {
        self.status = derive_status(self.status, alerts);
        self.last_updated = Utc::now();
    }
}
