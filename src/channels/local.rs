//! Local export source — reads already-downloaded exports from a directory.
//!
//! Object names resolve against the directory first; if that misses, the
//! bare file name is tried, so both a mirrored bucket layout
//! (`<dir>/reviews/reviews_<app>_<YYYYMM>.csv`) and a flat download folder work.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::channels::ExportSource;
use crate::error::TransferError;

pub struct LocalExportSource {
    root: PathBuf,
}

impl LocalExportSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(&self, object: &str) -> Vec<PathBuf> {
        let mut paths = vec![self.root.join(object)];
        if let Some(name) = Path::new(object).file_name() {
            let flat = self.root.join(name);
            if flat != paths[0] {
                paths.push(flat);
            }
        }
        paths
    }
}

#[async_trait]
impl ExportSource for LocalExportSource {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(&self, object: &str) -> Result<Vec<u8>, TransferError> {
        for path in self.candidates(object) {
            match fs::read(&path).await {
                Ok(bytes) => {
                    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read local export");
                    return Ok(bytes);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(TransferError::Io {
                        object: object.to_string(),
                        source,
                    });
                }
            }
        }
        Err(TransferError::NotFound {
            object: object.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_mirrored_layout() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("reviews")).unwrap();
        std::fs::write(tmp.path().join("reviews/reviews_app_202401.csv"), b"data").unwrap();

        let src = LocalExportSource::new(tmp.path());
        assert_eq!(src.fetch("reviews/reviews_app_202401.csv").await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn falls_back_to_flat_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("reviews_app_202401.csv"), b"flat").unwrap();

        let src = LocalExportSource::new(tmp.path());
        assert_eq!(src.fetch("reviews/reviews_app_202401.csv").await.unwrap(), b"flat");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let src = LocalExportSource::new(tmp.path());
        assert!(matches!(
            src.fetch("reviews/none.csv").await,
            Err(TransferError::NotFound { .. })
        ));
    }
}
