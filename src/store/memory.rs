//! In-memory ledger store, for tests and dry runs.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::store::traits::{LedgerEntry, LedgerStore};

/// Ledger store that keeps entries in a `Vec`, in append order.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    entries: Mutex<Vec<LedgerEntry>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store.
    pub fn with_entries(entries: Vec<LedgerEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Snapshot of every appended entry.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn load(&self) -> Result<HashSet<String>, LedgerError> {
        Ok(self.entries().into_iter().map(|e| e.id).collect())
    }

    async fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry.clone());
        Ok(())
    }
}
