/// In-memory symbol provider for tests and dry runs.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{ProviderError, SymbolProvider};
use crate::model::SymbolNode;

/// Serves prepared symbol trees keyed by file path.
#[derive(Debug, Default, Clone)]
pub struct StaticProvider {
    trees: HashMap<PathBuf, Vec<SymbolNode>>,
    /// Number of `document_symbols` calls served, failed ones included.
    pub requests: usize,
}

impl StaticProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<P: Into<PathBuf>>(&mut self, path: P, symbols: Vec<SymbolNode>) {
        self.trees.insert(path.into(), symbols);
    }

    #[must_use]
    pub fn with_tree<P: Into<PathBuf>>(mut self, path: P, symbols: Vec<SymbolNode>) -> Self {
        self.insert(path, symbols);
        self
    }
}

impl SymbolProvider for StaticProvider {
    async fn document_symbols(&mut self, path: &Path) -> Result<Vec<SymbolNode>, ProviderError> {
        self.requests += 1;
        self.trees
            .get(path)
            .cloned()
            .ok_or_else(|| ProviderError::Protocol(format!("no symbols for {}", path.display())))
    }
}
