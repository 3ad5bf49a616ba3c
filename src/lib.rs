//! Review Notifier — app-store review export to chat webhook.

pub mod channels;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod runner;
pub mod store;
