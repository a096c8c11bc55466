//! Create and update flows against a [`PageClient`].
//!
//! Updates go through an [`UpdateStrategy`]. The only strategy is
//! [`ReplaceStrategy`]: delete the existing page, then create a new one. The
//! page id and url change on every update, so anything linking to the old page
//! breaks. Remote blocks are never diffed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::contract::{Block, PageClient, RemotePageDescriptor};
use crate::document::FrontMatter;
use crate::error::{RemoteOperation, SchemaError, SyncError};
use crate::property::map_properties;

/// Fetch the schema, map the front-matter onto it and create the page.
pub async fn create_page(
    client: &dyn PageClient,
    database_id: &str,
    front_matter: &FrontMatter,
    blocks: &[Block],
) -> Result<RemotePageDescriptor, SyncError> {
    info!(database_id, "[SYNC][CREATE] Fetching database schema");
    let schema = client
        .get_database_schema(database_id)
        .await
        .map_err(|e| {
            error!(database_id, error = ?e, "[SYNC][ERROR][CREATE] Schema fetch failed");
            SyncError::Schema {
                database_id: database_id.to_string(),
                source: SchemaError::Fetch(e),
            }
        })?;
    if schema.is_empty() {
        error!(database_id, "[SYNC][ERROR][CREATE] Database declares no properties");
        return Err(SyncError::Schema {
            database_id: database_id.to_string(),
            source: SchemaError::NoProperties,
        });
    }

    let properties = map_properties(front_matter, &schema);
    info!(
        database_id,
        declared = schema.len(),
        mapped = properties.len(),
        blocks = blocks.len(),
        "[SYNC][CREATE] Creating page"
    );

    match client.create_page(database_id, &properties, blocks).await {
        Ok(page) => {
            info!(page_id = %page.id, url = %page.url, "[SYNC][CREATE] create_page succeeded");
            Ok(page)
        }
        Err(e) => {
            error!(database_id, error = ?e, "[SYNC][ERROR][CREATE] create_page failed");
            Err(SyncError::remote_write(RemoteOperation::CreatePage, e))
        }
    }
}

/// Everything an update needs besides the client.
#[derive(Debug, Clone, Copy)]
pub struct UpdateRequest<'a> {
    pub database_id: &'a str,
    pub page_id: &'a str,
    pub front_matter: &'a FrontMatter,
    pub blocks: &'a [Block],
}

/// How an already-synced document is pushed again.
#[async_trait]
pub trait UpdateStrategy: Send + Sync {
    async fn update(
        &self,
        client: &dyn PageClient,
        request: UpdateRequest<'_>,
    ) -> Result<RemotePageDescriptor, SyncError>;
}

/// Delete the old page, then create a replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceStrategy;

#[async_trait]
impl UpdateStrategy for ReplaceStrategy {
    async fn update(
        &self,
        client: &dyn PageClient,
        request: UpdateRequest<'_>,
    ) -> Result<RemotePageDescriptor, SyncError> {
        let page_id = request.page_id;
        info!(page_id, "[SYNC][REPLACE] Deleting existing page");
        if let Err(e) = client.delete_page(page_id).await {
            error!(page_id, error = ?e, "[SYNC][ERROR][REPLACE] delete_page failed");
            return Err(SyncError::remote_write(RemoteOperation::DeletePage, e));
        }
        info!(page_id, "[SYNC][REPLACE] Existing page deleted");

        create_page(
            client,
            request.database_id,
            request.front_matter,
            request.blocks,
        )
        .await
        .map_err(|e| {
            error!(
                page_id,
                error = %e,
                "[SYNC][ERROR][REPLACE] Page deleted but recreate failed; stored id is now dangling"
            );
            SyncError::PartialUpdate {
                deleted_page_id: page_id.to_string(),
                source: Box::new(e),
            }
        })
    }
}

/// Update strategy selected in the settings file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpdateStrategyKind {
    /// Delete and recreate the page.
    #[default]
    Replace,
    // Future: Diff, once remote block trees can be compared.
}

impl UpdateStrategyKind {
    pub fn strategy(&self) -> Box<dyn UpdateStrategy> {
        match self {
            UpdateStrategyKind::Replace => Box::new(ReplaceStrategy),
        }
    }
}

impl From<&str> for UpdateStrategyKind {
    fn from(s: &str) -> Self {
        match s {
            "replace" | "Replace" | "delete_and_recreate" => UpdateStrategyKind::Replace,
            other => {
                warn!(kind = other, "Unknown update strategy, defaulting to replace");
                UpdateStrategyKind::Replace
            }
        }
    }
}

impl From<String> for UpdateStrategyKind {
    fn from(s: String) -> Self {
        UpdateStrategyKind::from(s.as_str())
    }
}

impl From<UpdateStrategyKind> for String {
    fn from(kind: UpdateStrategyKind) -> Self {
        match kind {
            UpdateStrategyKind::Replace => "replace".to_string(),
        }
    }
}
