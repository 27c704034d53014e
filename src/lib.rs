//! # symchunk
//!
//! Turns the hierarchical document symbols reported by clangd into flat,
//! enriched semantic chunks for lexical and embedding search.
//!
//! ## Architecture
//!
//! - **[`model`]**: Symbol tree input types and the chunk output record
//! - **[`indexer`]**: Source discovery, symbol flattening, per-file pipeline
//! - **[`nl`]**: Identifier tokenization and text/code view synthesis
//! - **[`lsp`]**: Symbol provider seam, clangd client, in-memory provider
//! - **[`output`]**: JSON output and chunk statistics
//! - **[`config`]**: JSON configuration loading and validation

pub mod config;
pub mod indexer;
pub mod lsp;
pub mod model;
pub mod nl;
pub mod output;
