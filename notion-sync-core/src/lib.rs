#![doc = "notion-sync-core: core logic library for notion-sync."]

//! This crate holds the synchronisation protocol between a local markdown
//! document and a page in a remote (Notion) database: the front-matter codec,
//! the schema-driven property mapper, the create/replace flows and the
//! front-matter rewriter. Transport, markdown conversion and clipboard access
//! are collaborators behind the traits in [`contract`].
//!
//! # Usage
//! Build a [`synchronise::SyncContext`] from concrete collaborators and call
//! [`synchronise::synchronise`] with the document path and [`config::SyncSettings`].

pub mod config;
pub mod contract;
pub mod document;
pub mod error;
pub mod page_flow;
pub mod property;
pub mod rewrite;
pub mod store;
pub mod synchronise;
