use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::page_flow::UpdateStrategyKind;

/// Settings shared by every sync run. Loaded and saved by the host.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Integration token for the remote API.
    #[serde(default)]
    pub remote_api_token: String,
    /// Database used when the document names none.
    #[serde(default)]
    pub default_database_id: String,
    /// Workspace subdomain for public links (`{alias}.notion.site`).
    #[serde(default)]
    pub workspace_alias: Option<String>,
    #[serde(default)]
    pub proxy_url: Option<String>,
    /// Map the front-matter `tags` key onto the remote schema.
    #[serde(default)]
    pub include_tags: bool,
    #[serde(default)]
    pub update_strategy: UpdateStrategyKind,
}

impl SyncSettings {
    /// Workspace alias, if set to something other than whitespace.
    pub fn workspace_alias(&self) -> Option<&str> {
        self.workspace_alias
            .as_deref()
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
    }

    pub fn trace_loaded(&self) {
        info!(
            token_set = !self.remote_api_token.is_empty(),
            default_database_id = %self.default_database_id,
            workspace_alias = self.workspace_alias().unwrap_or(""),
            proxy = self.proxy_url.is_some(),
            include_tags = self.include_tags,
            update_strategy = ?self.update_strategy,
            "Loaded SyncSettings"
        );
        debug!(settings = ?self, "SyncSettings loaded (full debug)");
    }
}

impl std::fmt::Debug for SyncSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSettings")
            .field("remote_api_token", &"<redacted>")
            .field("default_database_id", &self.default_database_id)
            .field("workspace_alias", &self.workspace_alias)
            .field("proxy_url", &self.proxy_url)
            .field("include_tags", &self.include_tags)
            .field("update_strategy", &self.update_strategy)
            .finish()
    }
}
