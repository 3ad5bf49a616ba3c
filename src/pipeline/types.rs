//! Shared types for the review pipeline.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::RowFormatError;

// ── Export column layout ────────────────────────────────────────────

/// Fixed column indices of the review export.
pub mod columns {
    pub const APP_NAME: usize = 0;
    pub const VERSION: usize = 2;
    pub const DEVICE: usize = 4;
    pub const SUBMITTED_AT: usize = 7;
    pub const RATING: usize = 9;
    pub const TITLE: usize = 10;
    pub const TEXT: usize = 11;
    pub const URL: usize = 15;

    /// Rows shorter than this are malformed.
    pub const MIN_FIELDS: usize = 16;
}

/// Highest star rating.
pub const MAX_RATING: u8 = 5;

// ── Review row ──────────────────────────────────────────────────────

/// One review extracted from an export row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub app_name: String,
    pub version: String,
    pub device: String,
    /// 0..=5.
    pub rating: u8,
    pub title: String,
    pub text: String,
    /// Submission timestamp exactly as exported; doubles as the dedup identifier.
    pub submitted_at: String,
    /// May be empty.
    pub url: String,
}

impl ReviewRow {
    /// Extract a review from a full export row.
    pub fn from_fields(fields: &[String]) -> Result<Self, RowFormatError> {
        check_width(fields)?;
        let field = |i: usize| fields[i].clone();

        Ok(Self {
            app_name: field(columns::APP_NAME),
            version: field(columns::VERSION),
            device: field(columns::DEVICE),
            rating: parse_rating(&fields[columns::RATING])?,
            title: field(columns::TITLE),
            text: field(columns::TEXT),
            submitted_at: field(columns::SUBMITTED_AT),
            url: field(columns::URL),
        })
    }

    /// Whether the review carries body text worth announcing.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Reject rows without the full column layout.
pub fn check_width(fields: &[String]) -> Result<(), RowFormatError> {
    if fields.len() < columns::MIN_FIELDS {
        return Err(RowFormatError::TooFewFields {
            found: fields.len(),
            expected: columns::MIN_FIELDS,
        });
    }
    Ok(())
}

/// Parse a star rating, enforcing `0 <= rating <= 5`.
pub fn parse_rating(raw: &str) -> Result<u8, RowFormatError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| RowFormatError::Rating(raw.to_string()))?;
    u8::try_from(value)
        .ok()
        .filter(|r| *r <= MAX_RATING)
        .ok_or(RowFormatError::RatingOutOfRange(value))
}

/// Naive (timezone-less) formats accepted for submission timestamps.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a submission timestamp, discarding any timezone.
///
/// An offset, if present, is dropped and the wall-clock time kept as is.
pub fn parse_submitted_at(raw: &str) -> Result<NaiveDateTime, RowFormatError> {
    let value = raw.trim();
    let fail = || RowFormatError::Timestamp(raw.to_string());
    if value.is_empty() {
        return Err(fail());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%dT%H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Ok(dt.naive_local());
        }
    }

    let naive = value
        .strip_suffix('Z')
        .or_else(|| value.strip_suffix(" UTC"))
        .unwrap_or(value);
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Ok(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(naive, fmt) {
            return date.and_hms_opt(0, 0, 0).ok_or_else(fail);
        }
    }
    Err(fail())
}

// ── Pipeline results ────────────────────────────────────────────────

/// Per-export counters, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Data rows seen (header excluded).
    pub rows: usize,
    /// Already in the ledger.
    pub duplicates: usize,
    /// Older than the recency window.
    pub stale: usize,
    /// Skipped as malformed.
    pub malformed: usize,
    /// Newly appended to the ledger.
    pub recorded: usize,
    /// Messages produced.
    pub messages: usize,
}

/// Result of running one export through the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
    /// Formatted messages in export row order.
    pub messages: Vec<String>,
    pub report: ProcessReport,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn row(rating: &str) -> Vec<String> {
        let mut fields = vec![String::new(); 16];
        fields[columns::APP_NAME] = "App".into();
        fields[columns::VERSION] = "1.2".into();
        fields[columns::DEVICE] = "Pixel".into();
        fields[columns::SUBMITTED_AT] = "2024-01-01T00:00:00".into();
        fields[columns::RATING] = rating.into();
        fields[columns::TITLE] = "Great".into();
        fields[columns::TEXT] = "Loved it".into();
        fields[columns::URL] = "http://x".into();
        fields
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn extracts_fixed_columns() {
        let review = ReviewRow::from_fields(&row("4")).unwrap();
        assert_eq!(review.app_name, "App");
        assert_eq!(review.version, "1.2");
        assert_eq!(review.device, "Pixel");
        assert_eq!(review.rating, 4);
        assert_eq!(review.title, "Great");
        assert_eq!(review.text, "Loved it");
        assert_eq!(review.submitted_at, "2024-01-01T00:00:00");
        assert_eq!(review.url, "http://x");
        assert!(review.has_text());
    }

    #[test]
    fn short_row_is_malformed() {
        let fields = vec!["App".to_string(); 15];
        assert!(matches!(
            ReviewRow::from_fields(&fields),
            Err(RowFormatError::TooFewFields { found: 15, expected: 16 })
        ));
    }

    #[test]
    fn rating_must_be_integer_in_range() {
        assert_eq!(parse_rating(" 5 ").unwrap(), 5);
        assert_eq!(parse_rating("0").unwrap(), 0);
        assert!(matches!(parse_rating("five"), Err(RowFormatError::Rating(_))));
        assert!(matches!(parse_rating("6"), Err(RowFormatError::RatingOutOfRange(6))));
        assert!(matches!(parse_rating("-1"), Err(RowFormatError::RatingOutOfRange(-1))));
    }

    #[test]
    fn whitespace_text_is_not_announceable() {
        let mut fields = row("3");
        fields[columns::TEXT] = "  \t ".into();
        assert!(!ReviewRow::from_fields(&fields).unwrap().has_text());
    }

    #[test]
    fn timestamp_formats() {
        let expected = at(2024, 1, 1, 12, 30, 0);
        for raw in [
            "2024-01-01T12:30:00",
            "2024-01-01T12:30:00Z",
            "2024-01-01T12:30:00+08:00",
            "2024-01-01 12:30:00",
            "2024-01-01 12:30:00 UTC",
            "2024-01-01T12:30",
        ] {
            assert_eq!(parse_submitted_at(raw).unwrap(), expected, "{raw}");
        }
        assert_eq!(
            parse_submitted_at("2024-01-02").unwrap(),
            at(2024, 1, 2, 0, 0, 0)
        );
    }

    #[test]
    fn garbage_timestamp_is_malformed() {
        for raw in ["", "yesterday", "2024-13-40T00:00:00"] {
            assert!(
                matches!(parse_submitted_at(raw), Err(RowFormatError::Timestamp(_))),
                "{raw}"
            );
        }
    }
}
