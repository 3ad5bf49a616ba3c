//! `LedgerStore` trait — backend-agnostic persistence for the sent-review ledger.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::LedgerError;

/// One persisted ledger line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Review identifier (the export's submission timestamp string).
    pub id: String,
    /// Review body text, kept as an audit trail only.
    pub text: String,
}

impl LedgerEntry {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Append-only storage of processed review identifiers.
///
/// Stores never enforce uniqueness; callers check membership before appending.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Load every recorded identifier. A store that does not exist yet is empty.
    async fn load(&self) -> Result<HashSet<String>, LedgerError>;

    /// Durably record one entry.
    async fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerError>;
}
