use crate::indexer::{flatten, source};
use crate::lsp::{ProviderError, SymbolProvider};
use crate::model::SemanticChunk;
use crate::nl::views;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A file whose symbols could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct ChunkRunResult {
    /// Chunks of all processed files, file order then pre-order.
    pub chunks: Vec<SemanticChunk>,
    pub processed: usize,
    pub failed: usize,
    /// Processed files that had no extractable symbols.
    pub empty: usize,
    pub failures: Vec<FileFailure>,
}

pub struct Indexer<'a, P: SymbolProvider> {
    pub provider: &'a mut P,
}

impl<'a, P: SymbolProvider> Indexer<'a, P> {
    pub fn new(provider: &'a mut P) -> Self {
        Self { provider }
    }

    /// Symbols → chunk skeletons → views, for one file.
    pub async fn chunk_file<Q: AsRef<Path>>(
        &mut self,
        path: Q,
    ) -> Result<Vec<SemanticChunk>, ProviderError> {
        let path = path.as_ref();
        let symbols = self.provider.document_symbols(path).await?;

        let lines = source::read_source_lines(path);
        // Keep the caller's spelling of the path, normalised to forward slashes.
        let path_str = path.to_string_lossy().replace('\\', "/");

        let mut chunks = flatten::flatten_symbols(&symbols, &path_str, &lines);
        views::enrich_all(&mut chunks);
        Ok(chunks)
    }

    /// Chunks every file in order. A failing file is recorded and skipped.
    pub async fn chunk_files(&mut self, files: &[PathBuf]) -> ChunkRunResult {
        self.chunk_files_with_progress(files, |_, _| {}).await
    }

    /// Like [`Self::chunk_files`], calling `on_file(path, chunk_count)` after
    /// each file (`None` when the file failed).
    pub async fn chunk_files_with_progress<F>(
        &mut self,
        files: &[PathBuf],
        mut on_file: F,
    ) -> ChunkRunResult
    where
        F: FnMut(&Path, Option<usize>),
    {
        let mut result = ChunkRunResult::default();

        for path in files {
            match self.chunk_file(path).await {
                Ok(chunks) => {
                    result.processed += 1;
                    if chunks.is_empty() {
                        result.empty += 1;
                        debug!("no extractable symbols in {}", path.display());
                    } else {
                        debug!("created {} chunks from {}", chunks.len(), path.display());
                    }
                    on_file(path.as_path(), Some(chunks.len()));
                    result.chunks.extend(chunks);
                }
                Err(e) => {
                    warn!("skipping {}: {e}", path.display());
                    result.failed += 1;
                    result.failures.push(FileFailure {
                        path: path.clone(),
                        error: e.to_string(),
                    });
                    on_file(path.as_path(), None);
                }
            }
        }

        result
    }
}
