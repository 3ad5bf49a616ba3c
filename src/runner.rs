//! Run driver — one pass over every configured app.
//!
//! For each app: fetch the current month's export, run it through the
//! pipeline against a freshly loaded ledger, then deliver the messages.
//! Failures stay scoped to the app they happened in.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::channels::{ExportSource, Notifier};
use crate::config::export_object_name;
use crate::error::Result;
use crate::pipeline::{ProcessReport, ReviewProcessor};
use crate::store::{Ledger, LedgerStore};

/// Sent first when an app has new reviews.
pub fn new_reviews_header(app: &str) -> String {
    format!("New reviews or ratings for {app}")
}

/// Sent instead of reviews when an app has none.
pub fn no_new_reviews_message(app: &str) -> String {
    format!("No new Play Store reviews or ratings for {app}")
}

/// Outcome of one app's processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppReport {
    pub app: String,
    pub pipeline: ProcessReport,
    /// Messages delivered, header or "no new reviews" notice included.
    pub delivered: usize,
    /// Messages that failed delivery and are lost.
    pub delivery_failures: usize,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub apps: Vec<AppReport>,
    /// `(app, error)` for every app whose processing was aborted.
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    pub fn delivered(&self) -> usize {
        self.apps.iter().map(|a| a.delivered).sum()
    }

    pub fn delivery_failures(&self) -> usize {
        self.apps.iter().map(|a| a.delivery_failures).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives fetch → pipeline → delivery for a list of apps.
pub struct Runner {
    source: Arc<dyn ExportSource>,
    notifier: Arc<dyn Notifier>,
    ledger_store: Arc<dyn LedgerStore>,
    days_in_past: i64,
}

impl Runner {
    pub fn new(
        source: Arc<dyn ExportSource>,
        notifier: Arc<dyn Notifier>,
        ledger_store: Arc<dyn LedgerStore>,
        days_in_past: i64,
    ) -> Self {
        Self {
            source,
            notifier,
            ledger_store,
            days_in_past,
        }
    }

    /// Process every app in order. Never aborts early.
    pub async fn run(&self, apps: &[String], now: DateTime<Utc>) -> RunSummary {
        info!(
            now = %now,
            apps = apps.len(),
            source = self.source.name(),
            notifier = self.notifier.name(),
            "Starting review run"
        );

        let mut summary = RunSummary::default();
        for app in apps {
            match self.run_app(app, now).await {
                Ok(report) => summary.apps.push(report),
                Err(e) => {
                    error!(app = %app, error = %e, "Aborted processing for app");
                    summary.failed.push((app.clone(), e.to_string()));
                }
            }
        }

        info!(
            processed = summary.apps.len(),
            failed = summary.failed.len(),
            delivered = summary.delivered(),
            delivery_failures = summary.delivery_failures(),
            "Review run complete"
        );
        summary
    }

    /// Fetch, process and deliver one app's reviews.
    ///
    /// Transfer and ledger errors abort the app. Delivery errors are logged
    /// and counted; the ledger already marks those reviews as seen.
    pub async fn run_app(&self, app: &str, now: DateTime<Utc>) -> Result<AppReport> {
        let object = export_object_name(app, now);
        info!(app, object = %object, "Processing reviews");

        let raw = self.source.fetch(&object).await?;
        info!(app, bytes = raw.len(), "Downloaded report");

        let mut ledger = Ledger::load(Arc::clone(&self.ledger_store)).await?;
        let processor = ReviewProcessor::new(app, now.naive_utc(), self.days_in_past);
        let outcome = processor.process(&raw, &mut ledger).await?;

        let mut report = AppReport {
            app: app.to_string(),
            pipeline: outcome.report,
            ..AppReport::default()
        };

        if outcome.messages.is_empty() {
            info!(app, "No new reviews");
            self.deliver(app, &no_new_reviews_message(app), &mut report).await;
        } else {
            info!(app, count = outcome.messages.len(), "Posting reviews");
            self.deliver(app, &new_reviews_header(app), &mut report).await;
            for message in &outcome.messages {
                self.deliver(app, message, &mut report).await;
            }
        }

        Ok(report)
    }

    async fn deliver(&self, app: &str, message: &str, report: &mut AppReport) {
        match self.notifier.send(message).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                warn!(app, notifier = self.notifier.name(), error = %e, "Failed to send message");
                report.delivery_failures += 1;
            }
        }
    }
}
