//! Outcome notification building and delivery.
//!
//! The engine reports what it did through exactly one e-mail per pass: an
//! intro paragraph followed by a markdown table with one row per touched
//! record. [`ReportContent`] is the low-level renderer — asking it for
//! content before anything was rendered is a programming error. The
//! orchestrator-facing [`BackfillNotification`] always initializes the intro,
//! so a pass over zero backfilled records still produces a (default-body)
//! notification instead of failing.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::record::BackfillRecord;

/// Fixed subject line of the outcome notification.
pub const SUBJECT: &str = "Backfill hourly report";

const DESCRIPTION: &str = "\
**Here's a summary of latest backfills:**
---
";

const TABLE_HEADERS: &str = "\
| Alert summary | Alert | Job symbol | Total backfills (aprox.) | Push range |
| :---: | :---: | :---: | :---: | :---: |
";

// The push-range column is pending product input; see the open question on
// its computation.
const PUSH_RANGE_PLACEHOLDER: &str = "must add";

/// The rendered body of an outcome notification.
///
/// Content is built incrementally: the intro is laid down on the first
/// `include_records` call (even over an empty list), each record appends one
/// table row.
#[derive(Debug, Default)]
pub struct ReportContent {
    raw_content: Option<String>,
}

impl ReportContent {
    /// Creates an unrendered report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the intro (once) and one table row per record.
    pub fn include_records(&mut self, records: &[BackfillRecord]) {
        self.initialize_report_intro();
        for record in records {
            self.include_in_report(record);
        }
    }

    /// Returns the rendered body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotificationFieldUnset`] if nothing was rendered yet.
    pub fn as_string(&self) -> Result<String> {
        self.raw_content
            .clone()
            .ok_or(Error::NotificationFieldUnset { field: "content" })
    }

    fn initialize_report_intro(&mut self) {
        if self.raw_content.is_none() {
            self.raw_content = Some(format!("{DESCRIPTION}{TABLE_HEADERS}"));
        }
    }

    fn include_in_report(&mut self, record: &BackfillRecord) {
        let row = Self::build_table_row(record);
        if let Some(content) = self.raw_content.as_mut() {
            content.push_str(&row);
            content.push('\n');
        }
    }

    fn build_table_row(record: &BackfillRecord) -> String {
        let summary_id = record.summary_id;
        let alert_id = record.alert_id;
        let job_symbol = record.job_kind.as_deref().unwrap_or("N/A");
        let total_backfills = record.total_backfills_triggered;
        let push_range = PUSH_RANGE_PLACEHOLDER;

        format!("| {summary_id} | {alert_id} | {job_symbol} | {total_backfills} | {push_range} |")
    }
}

/// A ready-to-send notification payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailPayload {
    /// Recipient address.
    pub address: String,
    /// Subject line.
    pub subject: String,
    /// Rendered markdown body.
    pub content: String,
}

/// The orchestrator-facing notification writer.
///
/// Tolerates an empty record list (intro-only body) but still requires an
/// address before a payload can be produced.
#[derive(Debug, Default)]
pub struct BackfillNotification {
    address: Option<String>,
    content: Option<ReportContent>,
}

impl BackfillNotification {
    /// Creates an empty notification with the fixed subject.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the recipient address.
    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = Some(address.into());
    }

    /// Renders the records into the notification body.
    ///
    /// An empty slice yields the intro-only default body; it never fails the
    /// pass.
    pub fn include_records(&mut self, records: &[BackfillRecord]) {
        let mut content = ReportContent::new();
        content.include_records(records);
        self.content = Some(content);
    }

    /// Produces the payload for the mail channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotificationFieldUnset`] if the address or the
    /// content has not been set.
    pub fn as_payload(&self) -> Result<EmailPayload> {
        let address = self
            .address
            .clone()
            .ok_or(Error::NotificationFieldUnset { field: "address" })?;
        let content = self
            .content
            .as_ref()
            .ok_or(Error::NotificationFieldUnset { field: "content" })?
            .as_string()?;
        Ok(EmailPayload {
            address,
            subject: SUBJECT.to_string(),
            content,
        })
    }
}

/// Outbound mail delivery channel.
#[async_trait]
pub trait MailChannel: Send + Sync {
    /// Delivers one notification payload.
    async fn send(&self, payload: &EmailPayload) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{AlertId, SummaryId};
    use crate::record::RecordStatus;

    fn backfilled_record(alert_id: u64, summary_id: u64, triggered: u32) -> BackfillRecord {
        let mut record = BackfillRecord::new(
            AlertId::new(alert_id),
            SummaryId::new(summary_id),
            r#"[{"job_id":1}]"#,
        );
        record.status = RecordStatus::Backfilled;
        record.total_backfills_triggered = triggered;
        record.job_kind = Some("test-linux1804-64/opt-raptor".into());
        record
    }

    #[test]
    fn unrendered_content_is_a_precondition_error() {
        let content = ReportContent::new();
        assert!(matches!(
            content.as_string(),
            Err(Error::NotificationFieldUnset { field: "content" })
        ));
    }

    #[test]
    fn empty_record_list_yields_default_body() {
        let mut content = ReportContent::new();
        content.include_records(&[]);
        let body = content.as_string().unwrap();
        assert!(body.contains("summary of latest backfills"));
        assert!(body.contains("| Alert summary |"));
    }

    #[test]
    fn each_record_contributes_one_row() {
        let mut content = ReportContent::new();
        content.include_records(&[
            backfilled_record(1, 10, 4),
            backfilled_record(2, 10, 2),
        ]);
        let body = content.as_string().unwrap();
        assert!(body.contains("| 10 | 1 | test-linux1804-64/opt-raptor | 4 | must add |"));
        assert!(body.contains("| 10 | 2 | test-linux1804-64/opt-raptor | 2 | must add |"));
    }

    #[test]
    fn record_without_job_kind_renders_placeholder() {
        let mut record = backfilled_record(1, 10, 0);
        record.job_kind = None;
        let mut content = ReportContent::new();
        content.include_records(&[record]);
        assert!(content.as_string().unwrap().contains("| N/A |"));
    }

    #[test]
    fn notification_requires_address() {
        let mut notification = BackfillNotification::new();
        notification.include_records(&[]);
        assert!(matches!(
            notification.as_payload(),
            Err(Error::NotificationFieldUnset { field: "address" })
        ));
    }

    #[test]
    fn notification_over_empty_records_never_fails() {
        let mut notification = BackfillNotification::new();
        notification.set_address("perftest-alerts@example.com");
        notification.include_records(&[]);
        let payload = notification.as_payload().unwrap();
        assert_eq!(payload.subject, SUBJECT);
        assert!(!payload.content.is_empty());
    }
}
