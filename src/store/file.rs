//! File-backed ledger store.
//!
//! One entry per line, `identifier|text`, UTF-8, no header. Backslash, `|`,
//! CR and LF inside a field are escaped so every entry stays on one line and
//! the identifier always ends at the first unescaped `|`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::LedgerError;
use crate::store::traits::{LedgerEntry, LedgerStore};

const FIELD_SEPARATOR: char = '|';

/// Append-log ledger in a flat text file.
pub struct FileLedgerStore {
    path: PathBuf,
}

impl FileLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back the full audit log, in file order.
    pub async fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let Some(content) = self.read().await? else {
            return Ok(Vec::new());
        };
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(decode_line)
            .collect())
    }

    async fn read(&self) -> Result<Option<String>, LedgerError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl LedgerStore for FileLedgerStore {
    async fn load(&self) -> Result<HashSet<String>, LedgerError> {
        let ids: HashSet<String> = self.entries().await?.into_iter().map(|e| e.id).collect();
        debug!(path = %self.path.display(), count = ids.len(), "Loaded ledger");
        Ok(ids)
    }

    async fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        file.write_all(encode_line(entry).as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.sync_data().await.map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

/// Serialize one entry as a newline-terminated line.
pub fn encode_line(entry: &LedgerEntry) -> String {
    format!(
        "{}{}{}\n",
        escape_field(&entry.id),
        FIELD_SEPARATOR,
        escape_field(&entry.text)
    )
}

/// Parse one line (without its terminator). A line without a separator is
/// an identifier with empty text. Identifiers are kept byte-for-byte.
pub fn decode_line(line: &str) -> LedgerEntry {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut escaped = false;
    let split_at = line.char_indices().find_map(|(i, c)| {
        if escaped {
            escaped = false;
            None
        } else if c == '\\' {
            escaped = true;
            None
        } else if c == FIELD_SEPARATOR {
            Some(i)
        } else {
            None
        }
    });

    match split_at {
        Some(i) => LedgerEntry::new(
            unescape_field(&line[..i]),
            unescape_field(&line[i + FIELD_SEPARATOR.len_utf8()..]),
        ),
        None => LedgerEntry::new(unescape_field(line), String::new()),
    }
}

fn escape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
