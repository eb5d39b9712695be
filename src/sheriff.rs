//! The sheriffing orchestrator.
//!
//! [`SheriffBot`] runs one bounded sheriffing pass per scheduled invocation:
//!
//! 1. Check the wall-clock budget (measured from construction, not from the
//!    start of the pass).
//! 2. Ask the report maintainer to refresh eligible records.
//! 3. Re-check the budget.
//! 4. Walk the ready records, triggering backfills while platform quota and
//!    budget last, debiting the quota ledger once afterwards.
//! 5. Re-check the budget.
//! 6. Send exactly one notification summarizing every record touched.
//!
//! A budget overrun at any checkpoint unwinds the whole pass with
//! [`Error::MaxRuntimeExceeded`]; nothing is rolled back, because each stage
//! persists its completed work before the next checkpoint. The scheduler is
//! expected to simply try again on its next tick.
//!
//! ## Design Principles
//!
//! - **Two failure kinds, never unified**: a record failing is a result value
//!   (terminal status + log entry); the pass aborting is a propagating error.
//! - **Coarse cooperative cancellation**: the deadline is polled between
//!   stages and once per record/data point — no preemption, no spawned work.
//! - **Single read, single debit**: quota is read once before the loop and
//!   debited once after it, so a pass that stops early still reports exact
//!   partial consumption.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::executor::BackfillExecutor;
use crate::maintainer::ReportMaintainer;
use crate::metrics::{SheriffMetrics, TimingGuard};
use crate::notify::{BackfillNotification, MailChannel};
use crate::record::{BackfillRecord, RecordStatus};
use crate::secretary::Secretary;
use crate::store::SheriffStore;

/// Configuration for one sheriffing pass.
///
/// Injected explicitly by the bootstrap layer; the engine never reads
/// ambient global state.
#[derive(Debug, Clone)]
pub struct SheriffConfig {
    /// Maximum wall-clock runtime, measured from bot construction.
    pub max_runtime: Duration,
    /// Platform key whose records this pass processes.
    pub platform: String,
    /// Recipient of the outcome notification.
    pub receiver: String,
}

impl Default for SheriffConfig {
    fn default() -> Self {
        Self {
            max_runtime: Duration::from_secs(50 * 60),
            platform: "linux".into(),
            receiver: "perf-sheriffs@example.com".into(),
        }
    }
}

/// The core control loop of the performance-sheriffing engine.
///
/// Construct one bot per scheduled tick: the runtime budget starts counting
/// at construction time.
pub struct SheriffBot {
    store: Arc<dyn SheriffStore>,
    maintainer: Arc<dyn ReportMaintainer>,
    executor: Arc<dyn BackfillExecutor>,
    secretary: Arc<dyn Secretary>,
    mail: Arc<dyn MailChannel>,
    config: SheriffConfig,
    woke_up_at: Instant,
    /// Every record touched by the backfill loop, for outcome reporting.
    backfilled_records: Vec<BackfillRecord>,
    metrics: SheriffMetrics,
}

impl SheriffBot {
    /// Creates a bot with the given collaborators and configuration.
    #[must_use]
    pub fn new(
        store: Arc<dyn SheriffStore>,
        maintainer: Arc<dyn ReportMaintainer>,
        executor: Arc<dyn BackfillExecutor>,
        secretary: Arc<dyn Secretary>,
        mail: Arc<dyn MailChannel>,
        config: SheriffConfig,
    ) -> Self {
        Self {
            store,
            maintainer,
            executor,
            secretary,
            mail,
            config,
            woke_up_at: Instant::now(),
            backfilled_records: Vec::new(),
            metrics: SheriffMetrics::new(),
        }
    }

    /// Runs one full sheriffing pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MaxRuntimeExceeded`] if the budget runs out at a
    /// checkpoint, or any storage/mail error from the collaborators. Errors
    /// local to one record or one data point are contained and never
    /// propagate from here.
    #[tracing::instrument(
        skip(self, frameworks, repositories),
        fields(platform = %self.config.platform, since = %since)
    )]
    pub async fn sheriff(
        &mut self,
        since: DateTime<Utc>,
        frameworks: &[String],
        repositories: &[String],
    ) -> Result<()> {
        let metrics = self.metrics;
        let _pass_timer = TimingGuard::new(move |elapsed| metrics.observe_pass_duration(elapsed));
        let result = self.run_pass(since, frameworks, repositories).await;
        match &result {
            Ok(()) => self.metrics.record_pass("completed"),
            Err(Error::MaxRuntimeExceeded { .. }) => self.metrics.record_pass("runtime_exceeded"),
            Err(_) => self.metrics.record_pass("errored"),
        }
        result
    }

    /// Returns true if the wall-clock budget has been used up.
    #[must_use]
    pub fn runtime_exceeded(&self) -> bool {
        self.woke_up_at.elapsed() >= self.config.max_runtime
    }

    /// Checks the budget at a stage boundary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MaxRuntimeExceeded`] if the budget is exhausted.
    pub fn assert_can_run(&self) -> Result<()> {
        if self.runtime_exceeded() {
            return Err(Error::MaxRuntimeExceeded {
                elapsed: self.woke_up_at.elapsed(),
                budget: self.config.max_runtime,
            });
        }
        Ok(())
    }

    /// The records touched by the last pass, in processing order.
    #[must_use]
    pub fn backfilled_records(&self) -> &[BackfillRecord] {
        &self.backfilled_records
    }

    async fn run_pass(
        &mut self,
        since: DateTime<Utc>,
        frameworks: &[String],
        repositories: &[String],
    ) -> Result<()> {
        self.assert_can_run()?;

        // The selection step only handles preliminary records/reports; it
        // always runs first so the loop below sees a fresh candidate set.
        let affected = self
            .maintainer
            .provide_updated_reports(since, frameworks, repositories)
            .await?;
        debug!(affected, "report maintenance finished");
        self.assert_can_run()?;

        self.backfill().await?;
        self.assert_can_run()?;

        self.notify_backfill_outcome().await
    }

    /// Converts ready records into terminal outcomes, bounded by platform
    /// quota and the time budget.
    async fn backfill(&mut self) -> Result<()> {
        let platform = self.config.platform.clone();
        let mut left = self.secretary.backfills_left(&platform).await?;
        let mut total_consumed = 0u32;

        let candidates = self.store.ready_records(&platform).await?;
        for mut record in candidates {
            if left == 0 || self.runtime_exceeded() {
                break;
            }
            let (remaining, consumed) = self.backfill_record(&mut record, left).await?;
            left = remaining;
            total_consumed += consumed;
            self.backfilled_records.push(record);
        }

        // One debit for the whole loop, even when it stopped early.
        self.secretary
            .consume_backfills(&platform, total_consumed)
            .await?;
        self.metrics.record_backfills_triggered(total_consumed);
        debug!(left, total_consumed, "backfill loop finished");
        Ok(())
    }

    /// Processes one ready record; returns `(left, consumed)`.
    ///
    /// A malformed context marks the record failed and consumes nothing. A
    /// failing data point — the executor refusing it, or the point lacking a
    /// job id — is logged and skipped; it never aborts the record.
    async fn backfill_record(
        &self,
        record: &mut BackfillRecord,
        mut left: u32,
    ) -> Result<(u32, u32)> {
        let mut consumed = 0u32;

        let context = match record.get_context() {
            Ok(context) => context,
            Err(err) => {
                warn!(
                    alert_id = %record.alert_id,
                    %err,
                    "failed to backfill record: invalid context"
                );
                record.status = RecordStatus::Failed;
                self.store.save_record(record).await?;
                self.metrics.record_outcome("malformed_context");
                return Ok((left, consumed));
            }
        };

        for data_point in &context {
            if left == 0 || self.runtime_exceeded() {
                break;
            }
            let Some(job_id) = data_point.job_id else {
                debug!(
                    alert_id = %record.alert_id,
                    "data point lacks a job id; skipping it"
                );
                continue;
            };
            match self.executor.trigger(job_id).await {
                Ok(triggered) => {
                    left -= 1;
                    consumed += 1;
                    if record.job_kind.is_none() {
                        record.job_kind = Some(triggered.job_kind);
                    }
                }
                Err(err) => {
                    debug!(
                        alert_id = %record.alert_id,
                        %job_id,
                        %err,
                        "failed to trigger backfill for data point"
                    );
                }
            }
        }

        let (success, outcome) = record.note_backfill_outcome(context.len(), consumed)?;
        if success {
            info!(alert_id = %record.alert_id, outcome, "record backfilled");
        } else {
            warn!(alert_id = %record.alert_id, outcome, "record failed");
        }
        self.metrics
            .record_outcome(if success { "backfilled" } else { "failed" });
        self.store.save_record(record).await?;

        Ok((left, consumed))
    }

    /// Builds and sends the single per-pass notification.
    async fn notify_backfill_outcome(&self) -> Result<()> {
        let mut notification = BackfillNotification::new();
        notification.set_address(&self.config.receiver);
        notification.include_records(&self.backfilled_records);
        let payload = notification.as_payload()?;
        self.mail.send(&payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::NoOpExecutor;
    use crate::maintainer::NoOpMaintainer;
    use crate::notify::EmailPayload;
    use crate::secretary::InMemorySecretary;
    use crate::store::memory::InMemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct RecordingMailChannel {
        sent: AtomicUsize,
    }

    #[async_trait]
    impl MailChannel for RecordingMailChannel {
        async fn send(&self, _payload: &EmailPayload) -> Result<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn bot_with(config: SheriffConfig, mail: Arc<RecordingMailChannel>) -> SheriffBot {
        SheriffBot::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(NoOpMaintainer),
            Arc::new(NoOpExecutor),
            Arc::new(InMemorySecretary::new()),
            mail,
            config,
        )
    }

    #[tokio::test]
    async fn exhausted_budget_aborts_before_anything_happens() {
        let mail = Arc::new(RecordingMailChannel::default());
        let mut bot = bot_with(
            SheriffConfig {
                max_runtime: Duration::ZERO,
                ..SheriffConfig::default()
            },
            mail.clone(),
        );

        let err = bot.sheriff(Utc::now(), &[], &[]).await.unwrap_err();
        assert!(matches!(err, Error::MaxRuntimeExceeded { .. }));
        assert!(bot.backfilled_records().is_empty());
        assert_eq!(mail.sent.load(Ordering::SeqCst), 0, "no notification sent");
    }

    #[tokio::test]
    async fn empty_pass_still_sends_one_notification() {
        let mail = Arc::new(RecordingMailChannel::default());
        let mut bot = bot_with(SheriffConfig::default(), mail.clone());

        bot.sheriff(Utc::now(), &[], &[]).await.unwrap();
        assert!(bot.backfilled_records().is_empty());
        assert_eq!(mail.sent.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_config_has_fifty_minute_budget() {
        let config = SheriffConfig::default();
        assert_eq!(config.max_runtime, Duration::from_secs(3000));
        assert_eq!(config.platform, "linux");
    }
}
