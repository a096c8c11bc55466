//! Top-level orchestration: one document → one remote page.
//!
//! [`synchronise`] runs the whole round trip for a single markdown file:
//!   - reads the document and splits off its front-matter
//!   - resolves the target database id (url → explicit id → configured default)
//!   - converts the body to blocks
//!   - creates a new page, or replaces the existing one when `remotePageId` is set
//!   - writes `link` and the new `remotePageId` back into the document
//!
//! # Ordering
//! Every step awaits the previous one. The schema is fetched before properties
//! are built, and an existing page is deleted before its replacement is created.
//!
//! # Error Handling
//! Nothing is retried. The first failing step ends the run with a classified
//! [`SyncError`]; a failed clipboard copy is the only non-fatal outcome and is
//! reported on [`SyncReport::clipboard_warning`].
//!
//! # Concurrency
//! There is no locking. The caller must not run two syncs for the same document
//! at once: two interleaved replaces can leave the document pointing at a page
//! the other run deleted.

use std::path::Path;
use tracing::{error, info};

use crate::config::SyncSettings;
use crate::contract::{
    BlockConverter, Clipboard, DocumentStore, PageClient, RemotePageDescriptor,
};
use crate::document::{Document, FrontMatter, TAGS_KEY};
use crate::error::{ClipboardWarning, SyncError};
use crate::page_flow::{create_page, UpdateRequest};
use crate::rewrite::apply_result;

/// The collaborators one sync run talks to.
#[derive(Clone, Copy)]
pub struct SyncContext<'a> {
    pub client: &'a dyn PageClient,
    pub converter: &'a dyn BlockConverter,
    pub store: &'a dyn DocumentStore,
    pub clipboard: &'a dyn Clipboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    Created,
    /// The page `previous_page_id` was deleted and replaced.
    Replaced { previous_page_id: String },
}

#[derive(Debug)]
pub struct SyncReport {
    pub page: RemotePageDescriptor,
    pub action: SyncAction,
    pub database_id: String,
    /// The link written into the document (alias applied).
    pub link: String,
    pub document: Document,
    pub clipboard_warning: Option<ClipboardWarning>,
}

pub async fn synchronise(
    path: &Path,
    settings: &SyncSettings,
    ctx: &SyncContext<'_>,
) -> Result<SyncReport, SyncError> {
    info!(path = %path.display(), "[SYNC] Starting document synchronisation");

    // --- Step 1: Read and split ---
    let raw = ctx.store.read(path).await.map_err(|e| {
        error!(path = %path.display(), error = ?e, "[SYNC][ERROR] Failed to read document");
        SyncError::Document {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;
    let document = Document::parse(&raw).map_err(|reason| {
        error!(
            path = %path.display(),
            reason = %reason,
            "[SYNC][ERROR] Failed to parse front-matter"
        );
        SyncError::Document {
            path: path.to_path_buf(),
            reason,
        }
    })?;

    // --- Step 2: Resolve the target database ---
    let database_id = resolve_database_id(&document.front_matter, settings)?;
    info!(database_id = %database_id, "[SYNC] Resolved target database");

    // --- Step 3: Convert the body ---
    let blocks = ctx.converter.to_blocks(&document.body);
    info!(blocks = blocks.len(), "[SYNC] Converted body to blocks");

    let front_matter = if settings.include_tags {
        document.front_matter.clone()
    } else {
        document.front_matter.without(TAGS_KEY)
    };

    // --- Step 4: Create or replace ---
    let (page, action) = match document.front_matter.remote_page_id() {
        Some(page_id) => {
            info!(
                page_id = %page_id,
                strategy = ?settings.update_strategy,
                "[SYNC] Document already synced, updating"
            );
            let request = UpdateRequest {
                database_id: &database_id,
                page_id: &page_id,
                front_matter: &front_matter,
                blocks: &blocks,
            };
            let page = settings
                .update_strategy
                .strategy()
                .update(ctx.client, request)
                .await?;
            (
                page,
                SyncAction::Replaced {
                    previous_page_id: page_id,
                },
            )
        }
        None => {
            info!("[SYNC] No remote page recorded, creating");
            let page = create_page(ctx.client, &database_id, &front_matter, &blocks).await?;
            (page, SyncAction::Created)
        }
    };

    // --- Step 5: Write ids back ---
    let applied = apply_result(
        ctx.store,
        ctx.clipboard,
        path,
        &document,
        &page,
        settings,
    )
    .await?;

    info!(page_id = %page.id, action = ?action, "[SYNC] Synchronisation complete");
    Ok(SyncReport {
        page,
        action,
        database_id,
        link: applied.link,
        document: applied.document,
        clipboard_warning: applied.clipboard_warning,
    })
}

/// Pick the database a document syncs into.
///
/// `remoteDatabaseUrl` wins when its last path segment is non-empty, then
/// `remoteDatabaseId`, then the configured default.
pub fn resolve_database_id(
    front_matter: &FrontMatter,
    settings: &SyncSettings,
) -> Result<String, SyncError> {
    if let Some(url) = front_matter.remote_database_url() {
        if let Some(id) = database_id_from_url(&url)? {
            return Ok(id);
        }
    }
    if let Some(id) = front_matter.remote_database_id() {
        return Ok(id);
    }
    let fallback = settings.default_database_id.trim();
    if !fallback.is_empty() {
        return Ok(fallback.to_string());
    }
    error!("[SYNC][ERROR] No database id in document or settings");
    Err(SyncError::Configuration(
        "no database id: set remoteDatabaseUrl or remoteDatabaseId in the document, or default_database_id in settings".to_string(),
    ))
}

/// Last path segment of a database url, if it is non-empty.
pub fn database_id_from_url(raw: &str) -> Result<Option<String>, SyncError> {
    let url = url::Url::parse(raw).map_err(|e| {
        SyncError::Configuration(format!("invalid database url {raw:?}: {e}"))
    })?;
    let last = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");
    Ok((!last.is_empty()).then(|| last.to_string()))
}
