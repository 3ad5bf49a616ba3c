use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use review_notifier::channels::{ExportSource, GcsExportSource, LocalExportSource, SlackWebhook};
use review_notifier::config::{ExportLocation, NotifierConfig, log_file_appender};
use review_notifier::runner::Runner;
use review_notifier::store::FileLedgerStore;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = NotifierConfig::from_env();

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(config.as_ref().ok().and_then(|c| c.log_dir.as_deref()))?;

    let config = config.context("invalid configuration")?;

    eprintln!("📣 Review Notifier v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Apps: {}", config.apps.join(", "));
    eprintln!("   Window: {} days", config.days_in_past);
    eprintln!("   Ledger: {}", config.ledger_path.display());

    // ── Export source ───────────────────────────────────────────────────
    let source: Arc<dyn ExportSource> = match &config.export_location {
        ExportLocation::Bucket(bucket) => {
            eprintln!("   Source: gs://{bucket}");
            Arc::new(
                GcsExportSource::new(bucket.clone(), config.access_token.clone(), config.http_timeout)
                    .context("failed to build storage client")?,
            )
        }
        ExportLocation::Directory(dir) => {
            eprintln!("   Source: {}", dir.display());
            Arc::new(LocalExportSource::new(dir.clone()))
        }
    };

    // ── Delivery + ledger ───────────────────────────────────────────────
    let notifier = Arc::new(
        SlackWebhook::new(config.webhook_url.clone(), config.http_timeout)
            .context("failed to build webhook client")?,
    );
    let ledger_store = Arc::new(FileLedgerStore::new(config.ledger_path.clone()));

    let runner = Runner::new(source, notifier, ledger_store, config.days_in_past);
    let now = chrono::Utc::now();
    tracing::info!("Current time (UTC) is {now}");

    let summary = runner.run(&config.apps, now).await;
    for (app, error) in &summary.failed {
        eprintln!("   Failed: {app}: {error}");
    }

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_tracing(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = log_file_appender(dir).context("invalid configuration")?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    Ok(guard)
}
