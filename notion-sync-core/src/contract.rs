#![allow(unused)]

//! # contract: the collaborators a sync run talks to
//!
//! The orchestrator in [`crate::synchronise`] never touches the network, the
//! filesystem or the clipboard directly. It goes through the four traits in
//! this module:
//!
//! - [`PageClient`]: the remote database (schema fetch, page create, page delete)
//! - [`BlockConverter`]: markdown body → ordered [`Block`] sequence
//! - [`DocumentStore`]: reads and replaces the local markdown document
//! - [`Clipboard`]: best-effort copy of the final page link
//!
//! ## Mocking & Testing
//! Every trait is annotated for `mockall` so integration tests can script each
//! remote step (and its ordering) without a live workspace. The mocks are
//! exported behind the `test-export-mocks` feature, enabled by default.
//!
//! ## Errors
//! All collaborator methods return the boxed [`BoxError`]. The orchestrator is
//! responsible for classifying those into [`crate::error::SyncError`] variants.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use mockall::{automock, predicate::*};

pub use crate::error::BoxError;
use crate::property::{PropertyPayload, RemoteSchema};

/// One rendered content unit (paragraph, heading, list item...) in the remote
/// content model. The core passes blocks through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block(pub serde_json::Value);

impl From<serde_json::Value> for Block {
    fn from(value: serde_json::Value) -> Self {
        Block(value)
    }
}

/// What the remote returns for a freshly created page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePageDescriptor {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub last_edited_time: String,
}

/// Access to the remote page database.
///
/// Implementations own transport, authentication and any timeout policy.
/// None of these calls is retried by the caller.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PageClient: Send + Sync {
    /// Fetch the property schema of a database. Called once per sync, never cached.
    async fn get_database_schema(&self, database_id: &str) -> Result<RemoteSchema, BoxError>;

    /// Create a page under `database_id` with the given properties and body blocks.
    async fn create_page(
        &self,
        database_id: &str,
        properties: &PropertyPayload,
        blocks: &[Block],
    ) -> Result<RemotePageDescriptor, BoxError>;

    /// Delete (archive) a page.
    async fn delete_page(&self, page_id: &str) -> Result<(), BoxError>;
}

/// Converts a markdown body into remote blocks. Pure and infallible.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait BlockConverter: Send + Sync {
    fn to_blocks(&self, markdown: &str) -> Vec<Block>;
}

/// Where documents live. `write` replaces the whole file.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn read(&self, path: &Path) -> Result<String, BoxError>;

    async fn write(&self, path: &Path, text: &str) -> Result<(), BoxError>;
}

#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), BoxError>;
}
