/// Symbol provider trait and shared error type.
///
/// The flattener only needs a document-symbol tree per file; where it comes
/// from (a live clangd, a fixture) sits behind [`SymbolProvider`].
pub mod client;
pub mod mock;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::SymbolNode;

/// Errors that can occur while obtaining a symbol tree.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transport I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("{method} timed out after {secs}s")]
    Timeout { method: String, secs: u64 },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("server error {code}: {message}")]
    Server { code: i64, message: String },

    #[error("failed to read source {}: {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("server closed the connection")]
    Closed,
}

/// Source of document-symbol trees, one file at a time.
#[allow(async_fn_in_trait)]
pub trait SymbolProvider {
    /// Hierarchical symbols of `path`, top-level nodes in source order.
    async fn document_symbols(&mut self, path: &Path) -> Result<Vec<SymbolNode>, ProviderError>;
}
