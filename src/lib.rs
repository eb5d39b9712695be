//! # perf-sheriff
//!
//! Decision-and-execution engine for automatic performance sheriffing.
//!
//! This crate implements the core of a CI-results dashboard's backfilling
//! subsystem, providing:
//!
//! - **Bounded orchestration**: One pass per scheduled tick, under a strict
//!   wall-clock budget and a per-platform daily job quota
//! - **State Machines**: Backfill records driven to terminal outcomes with
//!   partial-failure accounting; summary statuses derived from their alerts
//! - **Exact Accounting**: The quota ledger is debited by precisely what a
//!   pass consumed, even when it stopped early
//! - **Outcome Reporting**: One summarized notification per pass
//!
//! ## Core Concepts
//!
//! - **Alert**: A detected statistically significant change in one
//!   performance series
//! - **Backfill record**: One unit of pending/attempted backfill work, one
//!   per alert
//! - **Data point**: One job identified as needing a re-test within a
//!   record's context
//!
//! ## Guarantees
//!
//! - **Deterministic prefix**: Candidates are processed in a stable order, so
//!   an abort on budget or quota leaves a well-defined prefix completed
//! - **Graceful degradation**: A budget overrun abandons the pass; work
//!   persisted before the checkpoint stays persisted and the next tick
//!   continues from there
//! - **Loud logic bugs**: Accounting invariant violations panic instead of
//!   being clamped
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chrono::Utc;
//! use perf_sheriff::executor::NoOpExecutor;
//! use perf_sheriff::maintainer::NoOpMaintainer;
//! use perf_sheriff::notify::{EmailPayload, MailChannel};
//! use perf_sheriff::secretary::InMemorySecretary;
//! use perf_sheriff::sheriff::{SheriffBot, SheriffConfig};
//! use perf_sheriff::store::memory::InMemoryStore;
//!
//! struct StdoutMail;
//!
//! #[async_trait::async_trait]
//! impl MailChannel for StdoutMail {
//!     async fn send(&self, payload: &EmailPayload) -> perf_sheriff::error::Result<()> {
//!         println!("{}: {}", payload.address, payload.subject);
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() -> perf_sheriff::error::Result<()> {
//! let mut bot = SheriffBot::new(
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(NoOpMaintainer),
//!     Arc::new(NoOpExecutor),
//!     Arc::new(InMemorySecretary::with_budgets([("linux".to_string(), 300)])),
//!     Arc::new(StdoutMail),
//!     SheriffConfig::default(),
//! );
//!
//! bot.sheriff(Utc::now(), &["raptor".into()], &["autoland".into()]).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod alert;
pub mod error;
pub mod executor;
pub mod ids;
pub mod maintainer;
pub mod metrics;
pub mod notify;
pub mod record;
pub mod report;
pub mod secretary;
pub mod sheriff;
pub mod store;
pub mod summary;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::alert::{AlertStatus, PerformanceAlert};
    pub use crate::error::{Error, Result};
    pub use crate::executor::{BackfillExecutor, TriggeredBackfill};
    pub use crate::ids::{AlertId, JobId, SummaryId};
    pub use crate::maintainer::ReportMaintainer;
    pub use crate::metrics::SheriffMetrics;
    pub use crate::notify::{BackfillNotification, EmailPayload, MailChannel};
    pub use crate::record::{BackfillRecord, DataPoint, RecordStatus};
    pub use crate::report::BackfillReport;
    pub use crate::secretary::Secretary;
    pub use crate::sheriff::{SheriffBot, SheriffConfig};
    pub use crate::store::SheriffStore;
    pub use crate::summary::{derive_status, AlertSummary, SummaryStatus};
}
