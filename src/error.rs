//! Error types for the review notifier.

/// Error that aborts one app's run. Delivery failures are logged per
/// message and configuration errors surface before any run starts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Export fetch errors. Abort processing of the affected app only.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Request for {object} failed: {reason}")]
    RequestFailed { object: String, reason: String },

    #[error("Fetching {object} returned HTTP {status}: {body}")]
    Status {
        object: String,
        status: u16,
        body: String,
    },

    #[error("Export {object} not found")]
    NotFound { object: String },

    #[error("IO error reading {object}: {source}")]
    Io {
        object: String,
        #[source]
        source: std::io::Error,
    },
}

/// A single malformed export row. The row is skipped and not recorded.
#[derive(Debug, thiserror::Error)]
pub enum RowFormatError {
    #[error("Row has {found} fields, expected at least {expected}")]
    TooFewFields { found: usize, expected: usize },

    #[error("Unparsable submission timestamp: {0:?}")]
    Timestamp(String),

    #[error("Unparsable rating: {0:?}")]
    Rating(String),

    #[error("Rating {0} outside 0..=5")]
    RatingOutOfRange(i64),

    #[error("Undecodable record: {0}")]
    Csv(String),
}

/// Webhook delivery errors. Logged; the message is considered lost.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Webhook request failed: {0}")]
    RequestFailed(String),

    #[error("Webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Ledger persistence errors. Never swallowed.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("IO error on ledger {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for the notifier.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_aborting_errors_convert_with_context() {
        let err: Error = TransferError::NotFound {
            object: "reviews/reviews_com.example_202401.csv".into(),
        }
        .into();
        assert!(matches!(err, Error::Transfer(_)));
        assert_eq!(
            err.to_string(),
            "Transfer error: Export reviews/reviews_com.example_202401.csv not found"
        );

        let err: Error = LedgerError::Io {
            path: "sent_reviews.txt".into(),
            source: std::io::Error::other("disk full"),
        }
        .into();
        assert!(matches!(err, Error::Ledger(_)));
    }
}
