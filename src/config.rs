//! Configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Datelike, Utc};
use secrecy::SecretString;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::error::ConfigError;

/// Default recency window in days.
pub const DEFAULT_DAYS_IN_PAST: i64 = 7;

/// Default ledger location, relative to the working directory.
pub const DEFAULT_LEDGER_PATH: &str = "sent_reviews.txt";

/// Default HTTP request timeout for both the export fetch and the webhook.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Where review exports are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportLocation {
    /// Google Cloud Storage bucket holding `reviews/` exports.
    Bucket(String),
    /// Local directory containing already-downloaded exports.
    Directory(PathBuf),
}

/// Notifier configuration.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// App package names, processed in order.
    pub apps: Vec<String>,
    /// Incoming webhook URL.
    pub webhook_url: SecretString,
    pub export_location: ExportLocation,
    /// Bearer token for Cloud Storage; anonymous access when absent.
    pub access_token: Option<SecretString>,
    /// Reviews older than this many days are ignored.
    pub days_in_past: i64,
    pub ledger_path: PathBuf,
    pub http_timeout: Duration,
    /// Optional directory for daily-rolling log files.
    pub log_dir: Option<PathBuf>,
}

impl NotifierConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let apps: Vec<String> = get("REVIEW_NOTIFIER_APPS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if apps.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "REVIEW_NOTIFIER_APPS".into(),
                hint: "Set a comma-separated list of app package names".into(),
            });
        }

        let webhook_url = get("SLACK_WEBHOOK_URL")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("SLACK_WEBHOOK_URL".into()))?;

        let export_location = match (get("REVIEW_NOTIFIER_EXPORT_DIR"), get("REVIEW_NOTIFIER_BUCKET")) {
            (Some(dir), _) => ExportLocation::Directory(PathBuf::from(dir)),
            (None, Some(bucket)) => ExportLocation::Bucket(bucket.trim().to_string()),
            (None, None) => {
                return Err(ConfigError::MissingRequired {
                    key: "REVIEW_NOTIFIER_BUCKET".into(),
                    hint: "Set a bucket name or REVIEW_NOTIFIER_EXPORT_DIR".into(),
                });
            }
        };

        let days_in_past = parse_or(&get, "REVIEW_NOTIFIER_DAYS_IN_PAST", DEFAULT_DAYS_IN_PAST)?;
        if days_in_past < 0 {
            return Err(ConfigError::InvalidValue {
                key: "REVIEW_NOTIFIER_DAYS_IN_PAST".into(),
                message: "must not be negative".into(),
            });
        }

        let timeout_secs = parse_or(
            &get,
            "REVIEW_NOTIFIER_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        Ok(Self {
            apps,
            webhook_url,
            export_location,
            access_token: get("GCS_ACCESS_TOKEN").map(SecretString::from),
            days_in_past,
            ledger_path: get("REVIEW_NOTIFIER_LEDGER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_PATH)),
            http_timeout: Duration::from_secs(timeout_secs),
            log_dir: get("REVIEW_NOTIFIER_LOG_DIR").map(PathBuf::from),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{raw:?}: {e}"),
        }),
    }
}

/// Daily-rolling log file writer under `dir`, created if missing.
pub fn log_file_appender(dir: &Path) -> Result<RollingFileAppender, ConfigError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("review-notifier.log")
        .build(dir)
        .map_err(|e| ConfigError::InvalidValue {
            key: "REVIEW_NOTIFIER_LOG_DIR".into(),
            message: format!("{}: {e}", dir.display()),
        })
}

/// Object path of an app's monthly review export,
/// e.g. `reviews/reviews_com.example_202401.csv`.
pub fn export_object_name(app: &str, now: DateTime<Utc>) -> String {
    format!("reviews/{}", export_file_name(app, now))
}

/// File name of an app's monthly review export.
pub fn export_file_name(app: &str, now: DateTime<Utc>) -> String {
    format!("reviews_{}_{}{:02}.csv", app, now.year(), now.month())
}
