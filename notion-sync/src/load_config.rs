//! `load_config` module: Loads a YAML settings file, with the API token injected from the environment, into [`SyncSettings`].
//!
//! This module is the only place where untrusted YAML settings are parsed into the
//! strongly-typed settings the core consumes.
//!
//! # Responsibilities
//! - Parse the user-supplied YAML settings file
//! - Inject the API token from `NOTION_API_TOKEN` when the file leaves it empty
//! - Fail with clear diagnostics: a sync must never start on half-loaded settings
//!
//! # Accepted keys
//! `remote_api_token`, `default_database_id`, `workspace_alias`, `proxy_url`,
//! `include_tags`, `update_strategy`. All are optional in the file; the token
//! must come from the file or the environment.
//!
//! # Errors
//! All errors in this module use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use notion_sync_core::config::SyncSettings;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Environment variable consulted when the settings file has no token.
pub const TOKEN_ENV: &str = "NOTION_API_TOKEN";

/// Loads a YAML settings file and injects the API token from the environment if needed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SyncSettings> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading settings from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Settings file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read settings file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut settings: SyncSettings = if config_content.trim().is_empty() {
        SyncSettings::default()
    } else {
        match serde_yaml::from_str(&config_content) {
            Ok(conf) => {
                info!(config_path = ?path_ref, "Parsed settings YAML successfully");
                conf
            }
            Err(e) => {
                error!(error = ?e, config_path = ?path_ref, "Failed to parse settings YAML");
                return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
            }
        }
    };

    if settings.remote_api_token.trim().is_empty() {
        match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => {
                info!("Using API token from {TOKEN_ENV}");
                settings.remote_api_token = token.trim().to_string();
            }
            _ => {
                error!(config_path = ?path_ref, "No API token in settings or environment");
                return Err(anyhow::anyhow!(
                    "No API token: set remote_api_token in {:?} or {TOKEN_ENV} in the environment",
                    path_ref
                ));
            }
        }
    }

    Ok(settings)
}
