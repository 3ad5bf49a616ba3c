//! Review processing pipeline.
//!
//! Every export flows through:
//! 1. `export::decode_export()` — UTF-16 decode + CSV rows, header dropped
//! 2. `ReviewProcessor::process()` — dedup, recency filter, ledger append
//! 3. `format::format_message()` — human-readable message per review
//!
//! The pipeline does no network I/O; fetching and delivery live in `channels`.

pub mod export;
pub mod format;
pub mod processor;
pub mod types;

pub use format::format_message;
pub use processor::ReviewProcessor;
pub use types::{ProcessOutcome, ProcessReport, ReviewRow};
