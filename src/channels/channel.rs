//! Channel traits — pure I/O at both ends of the pipeline.

use async_trait::async_trait;

use crate::error::{DeliveryError, TransferError};

/// Where review exports come from.
#[async_trait]
pub trait ExportSource: Send + Sync {
    /// Source name for logging (e.g. "gcs", "local").
    fn name(&self) -> &str;

    /// Fetch the raw bytes of one export object.
    async fn fetch(&self, object: &str) -> Result<Vec<u8>, TransferError>;
}

/// Where formatted messages go.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notifier name for logging (e.g. "slack").
    fn name(&self) -> &str;

    /// Deliver one message. No retries.
    async fn send(&self, message: &str) -> Result<(), DeliveryError>;
}
