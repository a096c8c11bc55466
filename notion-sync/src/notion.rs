#![doc = "Notion API client: implements the core PageClient trait over HTTP."]
//
//! # Notion client (CLI <-> Core)
//!
//! This module wires the [`PageClient`] trait from `notion-sync-core` to the
//! public Notion REST API. The core never sees HTTP; it only sees schemas,
//! payloads and page descriptors.
//!
//! - Construct [`NotionClient`] from [`SyncSettings`] (token, optional proxy).
//! - Every request carries the bearer token and the pinned `Notion-Version`.
//! - Non-2xx answers become [`NotionError::Api`], with the code and message
//!   from Notion's error body. A 404 on a schema fetch is [`NotionError::NotFound`].
//!
//! Page creation sends at most [`MAX_CHILDREN_PER_REQUEST`] blocks with the
//! page itself and appends the remainder in batches of the same size. If an
//! append fails the new page is deleted again, so a failed create leaves no
//! page behind.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

use notion_sync_core::config::SyncSettings;
use notion_sync_core::contract::{Block, BoxError, PageClient, RemotePageDescriptor};
use notion_sync_core::property::{PropertyPayload, PropertyType, RemoteSchema};

pub const NOTION_API_BASE: &str = "https://api.notion.com";
pub const NOTION_VERSION: &str = "2022-06-28";
/// Notion rejects requests with more children than this.
pub const MAX_CHILDREN_PER_REQUEST: usize = 100;

#[derive(Error, Debug)]
pub enum NotionError {
    #[error("database {0} not found or not shared with the integration")]
    NotFound(String),

    #[error("Notion API error (status {status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The page payload could not be encoded (e.g. a non-numeric `number`).
    #[error("invalid page payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DatabaseResponse {
    #[serde(default)]
    properties: HashMap<String, PropertyDeclaration>,
}

#[derive(Debug, Deserialize)]
struct PropertyDeclaration {
    #[serde(rename = "type")]
    kind: String,
}

pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl NotionClient {
    pub fn new(settings: &SyncSettings) -> Result<Self, BoxError> {
        Self::with_base_url(settings, NOTION_API_BASE)
    }

    /// Same as [`NotionClient::new`] against another API root (used by tests).
    pub fn with_base_url(settings: &SyncSettings, base_url: &str) -> Result<Self, BoxError> {
        let mut builder = reqwest::Client::builder();
        if let Some(proxy) = settings.proxy_url.as_deref().filter(|p| !p.trim().is_empty()) {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| {
                tracing::error!(error = ?e, proxy, "Invalid proxy url");
                e
            })?;
            builder = builder.proxy(proxy);
        }
        let http = builder.build()?;
        tracing::info!(
            token_set = !settings.remote_api_token.is_empty(),
            proxy = settings.proxy_url.is_some(),
            base_url,
            "Initialized NotionClient"
        );
        Ok(NotionClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: settings.remote_api_token.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    /// Archive a page (or any block) by id.
    async fn delete_block(&self, block_id: &str) -> Result<(), NotionError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/v1/blocks/{block_id}"))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn append_children(&self, block_id: &str, blocks: &[Block]) -> Result<(), NotionError> {
        for chunk in blocks.chunks(MAX_CHILDREN_PER_REQUEST) {
            tracing::debug!(block_id, count = chunk.len(), "Appending child blocks");
            let response = self
                .request(reqwest::Method::PATCH, &format!("/v1/blocks/{block_id}/children"))
                .json(&json!({ "children": chunk }))
                .send()
                .await?;
            ensure_success(response).await?;
        }
        Ok(())
    }
}

/// Pass a successful response through, or turn Notion's error body into [`NotionError::Api`].
async fn ensure_success(response: Response) -> Result<Response, NotionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or(ApiErrorBody {
        code: String::new(),
        message: text,
    });
    Err(NotionError::Api {
        status: status.as_u16(),
        code: body.code,
        message: body.message,
    })
}

#[async_trait]
impl PageClient for NotionClient {
    async fn get_database_schema(&self, database_id: &str) -> Result<RemoteSchema, BoxError> {
        tracing::info!(database_id, "Fetching database schema");
        let response = self
            .request(reqwest::Method::GET, &format!("/v1/databases/{database_id}"))
            .send()
            .await
            .map_err(NotionError::from)?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::error!(database_id, "Database not found");
            return Err(NotionError::NotFound(database_id.to_string()).into());
        }
        let database: DatabaseResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(NotionError::from)?;

        let schema: RemoteSchema = database
            .properties
            .into_iter()
            .map(|(name, declaration)| (name, PropertyType::from(declaration.kind.as_str())))
            .collect();
        tracing::info!(database_id, properties = schema.len(), "Fetched database schema");
        Ok(schema)
    }

    async fn create_page(
        &self,
        database_id: &str,
        properties: &PropertyPayload,
        blocks: &[Block],
    ) -> Result<RemotePageDescriptor, BoxError> {
        let properties = serde_json::to_value(properties).map_err(|e| {
            tracing::error!(error = ?e, database_id, "Page properties could not be encoded");
            NotionError::from(e)
        })?;
        let split = blocks.len().min(MAX_CHILDREN_PER_REQUEST);
        let (first, rest) = blocks.split_at(split);
        tracing::info!(
            database_id,
            blocks = blocks.len(),
            deferred = rest.len(),
            "Creating page"
        );

        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
            "children": first,
        });
        let response = self
            .request(reqwest::Method::POST, "/v1/pages")
            .json(&body)
            .send()
            .await
            .map_err(NotionError::from)?;
        let page: RemotePageDescriptor = match ensure_success(response).await {
            Ok(ok) => ok.json().await.map_err(NotionError::from)?,
            Err(e) => {
                tracing::error!(error = %e, database_id, "API error creating page");
                return Err(e.into());
            }
        };

        if !rest.is_empty() {
            if let Err(e) = self.append_children(&page.id, rest).await {
                tracing::error!(
                    error = %e,
                    page_id = %page.id,
                    "Page created but appending blocks failed, removing it"
                );
                // A half-written page must not outlive a failed create.
                if let Err(cleanup) = self.delete_block(&page.id).await {
                    tracing::error!(
                        error = %cleanup,
                        page_id = %page.id,
                        "Could not remove incomplete page"
                    );
                }
                return Err(e.into());
            }
        }
        tracing::info!(page_id = %page.id, url = %page.url, "Successfully created page");
        Ok(page)
    }

    async fn delete_page(&self, page_id: &str) -> Result<(), BoxError> {
        tracing::info!(page_id, "Deleting page");
        match self.delete_block(page_id).await {
            Ok(_) => {
                tracing::info!(page_id, "Successfully deleted page");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, page_id, "Failed to delete page");
                Err(e.into())
            }
        }
    }
}
