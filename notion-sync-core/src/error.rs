//! Error taxonomy for a single sync run.
//!
//! The core only classifies failures; the host decides how to word them.
//! Nothing in this crate retries, so every variant describes a final outcome.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by the collaborator traits in [`crate::contract`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Which remote write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOperation {
    CreatePage,
    DeletePage,
}

impl std::fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteOperation::CreatePage => f.write_str("create page"),
            RemoteOperation::DeletePage => f.write_str("delete page"),
        }
    }
}

/// Problems with the remote database schema. Both are configuration-class.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema could not be fetched (unknown database, no access, transport failure).
    #[error("failed to fetch schema: {0}")]
    Fetch(#[source] BoxError),

    /// The database exists but declares no properties.
    #[error("database declares no properties")]
    NoProperties,
}

#[derive(Error, Debug)]
pub enum SyncError {
    /// No database id could be resolved, or a database url could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The local document could not be read or its front-matter is not a mapping.
    #[error("document error at {path}: {reason}")]
    Document { path: PathBuf, reason: String },

    #[error("schema error for database {database_id}: {source}")]
    Schema {
        database_id: String,
        #[source]
        source: SchemaError,
    },

    #[error("remote {operation} failed: {source}")]
    RemoteWrite {
        operation: RemoteOperation,
        #[source]
        source: BoxError,
    },

    /// The old page was deleted but its replacement was never created.
    /// The id still stored in the document now points at nothing.
    #[error("page {deleted_page_id} was deleted but recreating it failed: {source}")]
    PartialUpdate {
        deleted_page_id: String,
        #[source]
        source: Box<SyncError>,
    },

    /// The remote write succeeded but the document could not be rewritten.
    #[error("page {page_id} was written remotely but saving {path} failed: {source}")]
    Persist {
        path: PathBuf,
        page_id: String,
        #[source]
        source: BoxError,
    },
}

impl SyncError {
    pub(crate) fn remote_write(operation: RemoteOperation, source: BoxError) -> Self {
        SyncError::RemoteWrite { operation, source }
    }

    /// True when remote state may no longer match the local document.
    pub fn leaves_inconsistent_state(&self) -> bool {
        matches!(
            self,
            SyncError::PartialUpdate { .. } | SyncError::Persist { .. }
        )
    }
}

/// The clipboard copy failed. The sync itself still succeeded.
#[derive(Error, Debug)]
#[error("could not copy {link} to the clipboard: {source}")]
pub struct ClipboardWarning {
    pub link: String,
    #[source]
    pub source: BoxError,
}
