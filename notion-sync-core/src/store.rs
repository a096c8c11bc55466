//! Filesystem-backed [`DocumentStore`].

use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use crate::contract::{BoxError, DocumentStore};

/// Reads and replaces documents on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

#[async_trait]
impl DocumentStore for FileStore {
    async fn read(&self, path: &Path) -> Result<String, BoxError> {
        let text = tokio::fs::read_to_string(path).await?;
        debug!(path = %path.display(), bytes = text.len(), "Read document");
        Ok(text)
    }

    async fn write(&self, path: &Path, text: &str) -> Result<(), BoxError> {
        tokio::fs::write(path, text).await?;
        debug!(path = %path.display(), bytes = text.len(), "Wrote document");
        Ok(())
    }
}
