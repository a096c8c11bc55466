//! Writes the result of a sync back into the local document.

use std::path::Path;
use tracing::{error, info, warn};

use crate::config::SyncSettings;
use crate::contract::{Clipboard, DocumentStore, RemotePageDescriptor};
use crate::document::Document;
use crate::error::{BoxError, ClipboardWarning, SyncError};

/// Host part of the canonical page urls handed out by the API.
pub const CANONICAL_HOST: &str = "www.notion.so";
/// Public site domain that workspace aliases are prefixed to.
pub const PUBLIC_SITE_DOMAIN: &str = "notion.site";

/// The document that was written, plus what happened to the clipboard copy.
#[derive(Debug)]
pub struct AppliedResult {
    pub document: Document,
    pub link: String,
    pub clipboard_warning: Option<ClipboardWarning>,
}

/// The link stored in the document.
///
/// With an alias, the first `www.notion.so` is replaced by `{alias}.notion.site`.
/// This is plain text substitution; the rest of the url is left byte-for-byte.
pub fn public_link(url: &str, workspace_alias: Option<&str>) -> String {
    match workspace_alias {
        Some(alias) => url.replacen(CANONICAL_HOST, &format!("{alias}.{PUBLIC_SITE_DOMAIN}"), 1),
        None => url.to_string(),
    }
}

/// The pre-sync document with `link` and `remotePageId` set from `page`.
pub fn rewrite(
    document: &Document,
    page: &RemotePageDescriptor,
    settings: &SyncSettings,
) -> Document {
    let mut rewritten = document.clone();
    let link = public_link(&page.url, settings.workspace_alias());
    rewritten.front_matter.set_link(&link);
    rewritten.front_matter.set_remote_page_id(&page.id);
    rewritten
}

/// Rewrite the document, replace it in `store`, then try the clipboard.
///
/// A failed write is a [`SyncError::Persist`]: the remote page exists but the
/// document does not know its id. A failed clipboard copy is only reported.
pub async fn apply_result(
    store: &dyn DocumentStore,
    clipboard: &dyn Clipboard,
    path: &Path,
    document: &Document,
    page: &RemotePageDescriptor,
    settings: &SyncSettings,
) -> Result<AppliedResult, SyncError> {
    let rewritten = rewrite(document, page, settings);
    let link = rewritten.front_matter.link().unwrap_or_default();

    let persist_error = |source: BoxError| SyncError::Persist {
        path: path.to_path_buf(),
        page_id: page.id.clone(),
        source,
    };
    let text = rewritten.render().map_err(|e| {
        error!(
            path = %path.display(),
            error = ?e,
            "[SYNC][ERROR][REWRITE] Failed to serialise front-matter"
        );
        persist_error(e.into())
    })?;
    store.write(path, &text).await.map_err(|e| {
        error!(
            path = %path.display(),
            page_id = %page.id,
            error = ?e,
            "[SYNC][ERROR][REWRITE] Failed to write document"
        );
        persist_error(e)
    })?;
    info!(
        path = %path.display(),
        page_id = %page.id,
        link = %link,
        "[SYNC][REWRITE] Document updated"
    );

    let clipboard_warning = match clipboard.write_text(&link).await {
        Ok(()) => None,
        Err(e) => {
            warn!(error = ?e, "[SYNC][REWRITE] Could not copy link to clipboard");
            Some(ClipboardWarning {
                link: link.clone(),
                source: e,
            })
        }
    };

    Ok(AppliedResult {
        document: rewritten,
        link,
        clipboard_warning,
    })
}
