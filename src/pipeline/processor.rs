//! Review processor — filters an export down to the messages worth sending.
//!
//! **Core invariant: at most one notification per review identifier.**
//! A row is recorded in the ledger as soon as it is accepted, whether or not
//! it produced a message, and before anything is delivered.
//!
//! Per row, in export order:
//! 1. Identifier already in the ledger → skip
//! 2. Older than the recency window → skip, not recorded
//! 3. Extract the review, format it if it has body text
//! 4. Append `(identifier, text)` to the ledger

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::error::{LedgerError, RowFormatError};
use crate::pipeline::export::{self, ExportRecord};
use crate::pipeline::types::{
    ProcessOutcome, ReviewRow, check_width, columns, parse_submitted_at,
};
use crate::store::Ledger;

/// What happened to one row.
#[derive(Debug)]
enum RowDecision {
    Duplicate,
    Stale,
    Recorded(Option<String>),
}

/// Review processor for one app's export.
pub struct ReviewProcessor {
    /// Used in log fields only.
    app: String,
    /// Run time, timezone-naive UTC.
    reference_time: NaiveDateTime,
    window: Duration,
}

impl ReviewProcessor {
    pub fn new(app: impl Into<String>, reference_time: NaiveDateTime, recency_window_days: i64) -> Self {
        Self {
            app: app.into(),
            reference_time,
            window: Duration::try_days(recency_window_days).unwrap_or(Duration::MAX),
        }
    }

    /// Run a raw export through dedup, recency filter and formatting.
    ///
    /// Malformed rows are logged and skipped. A ledger write failure aborts
    /// the export: messages gathered so far are dropped, and every row
    /// recorded before the failure stays recorded.
    pub async fn process(
        &self,
        raw: &[u8],
        ledger: &mut Ledger,
    ) -> Result<ProcessOutcome, LedgerError> {
        let records = export::decode_export(raw);
        info!(app = %self.app, rows = records.len(), "Processing review export");

        let mut outcome = ProcessOutcome::default();
        for record in records {
            outcome.report.rows += 1;

            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(app = %self.app, error = %e, "Skipping undecodable export row");
                    outcome.report.malformed += 1;
                    continue;
                }
            };

            match self.process_row(&record, ledger).await {
                Ok(RowDecision::Duplicate) => outcome.report.duplicates += 1,
                Ok(RowDecision::Stale) => outcome.report.stale += 1,
                Ok(RowDecision::Recorded(message)) => {
                    outcome.report.recorded += 1;
                    if let Some(message) = message {
                        outcome.messages.push(message);
                    }
                }
                Err(RowError::Format(e)) => {
                    warn!(
                        app = %self.app,
                        line = record.line,
                        review_id = record.fields.get(columns::SUBMITTED_AT).map(String::as_str).unwrap_or(""),
                        error = %e,
                        "Skipping malformed export row"
                    );
                    outcome.report.malformed += 1;
                }
                Err(RowError::Ledger(e)) => return Err(e),
            }
        }

        outcome.report.messages = outcome.messages.len();
        info!(
            app = %self.app,
            rows = outcome.report.rows,
            duplicates = outcome.report.duplicates,
            stale = outcome.report.stale,
            malformed = outcome.report.malformed,
            recorded = outcome.report.recorded,
            messages = outcome.report.messages,
            "Review export processed"
        );
        Ok(outcome)
    }

    async fn process_row(
        &self,
        record: &ExportRecord,
        ledger: &mut Ledger,
    ) -> Result<RowDecision, RowError> {
        check_width(&record.fields)?;
        let review_id = record.fields[columns::SUBMITTED_AT].as_str();

        if ledger.contains(review_id) {
            debug!(app = %self.app, review_id, "Ignoring already sent review");
            return Ok(RowDecision::Duplicate);
        }

        let submitted = parse_submitted_at(review_id)?;
        if self.is_stale(submitted) {
            debug!(app = %self.app, review_id, "Ignoring review outside recency window");
            return Ok(RowDecision::Stale);
        }

        let review = ReviewRow::from_fields(&record.fields)?;
        let message = review.has_text().then(|| review.to_message());

        ledger.append(review_id, &review.text).await?;
        debug!(
            app = %self.app,
            review_id,
            announced = message.is_some(),
            "Recorded review"
        );
        Ok(RowDecision::Recorded(message))
    }

    /// Strictly older than the window; a review exactly `window` old still counts.
    fn is_stale(&self, submitted: NaiveDateTime) -> bool {
        self.reference_time.signed_duration_since(submitted) > self.window
    }
}

/// Row-level failure: format errors skip the row, ledger errors abort.
#[derive(Debug)]
enum RowError {
    Format(RowFormatError),
    Ledger(LedgerError),
}

impl From<RowFormatError> for RowError {
    fn from(e: RowFormatError) -> Self {
        Self::Format(e)
    }
}

impl From<LedgerError> for RowError {
    fn from(e: LedgerError) -> Self {
        Self::Ledger(e)
    }
}
