//! Persistence layer — the append-only ledger of already-processed reviews.

pub mod file;
pub mod ledger;
pub mod memory;
pub mod traits;

pub use file::FileLedgerStore;
pub use ledger::Ledger;
pub use memory::MemoryLedgerStore;
pub use traits::{LedgerEntry, LedgerStore};
