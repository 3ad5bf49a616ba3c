//! `Ledger` — loaded identifier set plus the store it persists to.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::LedgerError;
use crate::store::traits::{LedgerEntry, LedgerStore};

/// Membership view of the ledger for one run.
///
/// The identifier set is loaded once; `append` persists first and only then
/// records the id in memory, so a failed write leaves the row eligible.
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
    seen: HashSet<String>,
}

impl Ledger {
    /// Load the current identifier set from `store`.
    pub async fn load(store: Arc<dyn LedgerStore>) -> Result<Self, LedgerError> {
        let seen = store.load().await?;
        Ok(Self { store, seen })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Durably record `(id, text)`.
    pub async fn append(&mut self, id: &str, text: &str) -> Result<(), LedgerError> {
        self.store.append(&LedgerEntry::new(id, text)).await?;
        self.seen.insert(id.to_string());
        Ok(())
    }
}
