//!
//! This module implements the CLI interface for notion-sync: command parsing,
//! wiring of concrete collaborators, and user-visible output.
//!
//! All synchronisation logic (front-matter, property mapping, create/replace,
//! rewrite) lives in the [`notion-sync-core`] crate. This module only builds a
//! [`SyncContext`] from real implementations and reports the outcome.
//!
//! ## How To Use
//! - For command-line users: `notion-sync sync --file note.md --config settings.yaml`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`notion-sync-core`]: ../../notion-sync-core/
use crate::clipboard::{NoClipboard, SystemClipboard};
use crate::load_config::load_config;
use crate::markdown::MarkdownBlockConverter;
use crate::notion::NotionClient;
use anyhow::Result;
use clap::{Parser, Subcommand};
use notion_sync_core::contract::Clipboard;
use notion_sync_core::error::SyncError;
use notion_sync_core::store::FileStore;
use notion_sync_core::synchronise::{synchronise, SyncAction, SyncContext};
use std::path::PathBuf;

/// CLI for notion-sync: publish a markdown note to a Notion database.
#[derive(Parser)]
#[clap(
    name = "notion-sync",
    version,
    about = "Publish a markdown note with YAML front-matter as a page in a Notion database"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or replace the Notion page for one markdown file
    Sync {
        /// Markdown file to publish; its front-matter is updated in place
        #[clap(long)]
        file: PathBuf,
        /// Path to the YAML settings file
        #[clap(long)]
        config: PathBuf,
        /// Do not copy the page link to the clipboard
        #[clap(long)]
        no_clipboard: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync {
            file,
            config,
            no_clipboard,
        } => {
            let settings = load_config(config)?;
            settings.trace_loaded();
            tracing::info!(command = "sync", file = %file.display(), "Starting synchronisation");

            let client = NotionClient::new(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to construct Notion client: {e}"))?;
            let clipboard: Box<dyn Clipboard> = if no_clipboard {
                Box::new(NoClipboard)
            } else {
                Box::new(SystemClipboard)
            };
            let ctx = SyncContext {
                client: &client,
                converter: &MarkdownBlockConverter,
                store: &FileStore,
                clipboard: clipboard.as_ref(),
            };

            match synchronise(&file, &settings, &ctx).await {
                Ok(report) => {
                    tracing::info!(
                        command = "sync",
                        page_id = %report.page.id,
                        "Synchronisation complete"
                    );
                    match &report.action {
                        SyncAction::Created => println!("Created {}", report.link),
                        SyncAction::Replaced { previous_page_id } => {
                            println!("Replaced {previous_page_id} with {}", report.link)
                        }
                    }
                    println!("remotePageId: {}", report.page.id);
                    if let Some(warning) = &report.clipboard_warning {
                        eprintln!("[WARN] {warning}");
                    }
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "sync", error = %e, "Synchronisation failed");
                    eprintln!("[ERROR] {}", notice(&e));
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}

/// Short, user-facing explanation of a failed sync.
pub fn notice(error: &SyncError) -> String {
    match error {
        SyncError::Configuration(_) => {
            "No target database. Add remoteDatabaseUrl or remoteDatabaseId to the front-matter, or set default_database_id.".to_string()
        }
        SyncError::Document { path, .. } => {
            format!("Could not read the front-matter of {}.", path.display())
        }
        SyncError::Schema { database_id, .. } => format!(
            "Database {database_id} has no usable schema. Check the id and that it is shared with the integration."
        ),
        SyncError::RemoteWrite { operation, .. } => {
            format!("Notion rejected the {operation} request. Nothing was changed locally.")
        }
        SyncError::PartialUpdate {
            deleted_page_id, ..
        } => format!(
            "Page {deleted_page_id} was deleted but could not be recreated. Remove remotePageId from the front-matter before retrying."
        ),
        SyncError::Persist { path, page_id, .. } => format!(
            "Page {page_id} was created but {} could not be updated. Set remotePageId: {page_id} by hand.",
            path.display()
        ),
    }
}
