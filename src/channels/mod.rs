//! Channel abstraction for export fetch and message delivery.

pub mod channel;
pub mod gcs;
pub mod local;
pub mod slack;

pub use channel::*;
pub use gcs::GcsExportSource;
pub use local::LocalExportSource;
pub use slack::SlackWebhook;
