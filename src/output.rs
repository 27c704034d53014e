//! JSON output and aggregate statistics for a chunk list.
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::model::SemanticChunk;

/// Writes `chunks` as a JSON array, pretty-printed unless `compact`.
///
/// Missing parent directories are created.
pub fn write_json<P: AsRef<Path>>(
    chunks: &[SemanticChunk],
    path: P,
    compact: bool,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    }

    let data = to_json(chunks, compact)?;
    fs::write(path, data)
        .with_context(|| format!("failed to write output: {}", path.display()))?;
    Ok(())
}

pub fn to_json(chunks: &[SemanticChunk], compact: bool) -> Result<String> {
    let data = if compact {
        serde_json::to_string(chunks)
    } else {
        serde_json::to_string_pretty(chunks)
    };
    data.context("failed to marshal chunks")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputStats {
    pub total_chunks: usize,
    pub with_docstring: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl OutputStats {
    #[must_use]
    pub fn from_chunks(chunks: &[SemanticChunk]) -> Self {
        let mut by_type = BTreeMap::new();
        for chunk in chunks {
            *by_type.entry(chunk.code_type.clone()).or_insert(0) += 1;
        }

        Self {
            total_chunks: chunks.len(),
            with_docstring: chunks.iter().filter(|c| !c.docstring.is_empty()).count(),
            by_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChunkContext;
    use tempfile::tempdir;

    fn chunk(name: &str, code_type: &str, docstring: &str) -> SemanticChunk {
        SemanticChunk {
            name: name.to_string(),
            signature: name.to_string(),
            code_type: code_type.to_string(),
            docstring: docstring.to_string(),
            line: 1,
            line_from: 1,
            line_to: 3,
            context: ChunkContext {
                module: "core".to_string(),
                file_path: "core/a.cpp".to_string(),
                file_name: "a.cpp".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_write_json_pretty_and_readback() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("out/nested/chunks.json");
        let chunks = vec![chunk("run", "Function", "Runs it"), chunk("Job", "Class", "")];

        write_json(&chunks, &path, false).unwrap();
        let data = fs::read_to_string(&path).unwrap();
        assert!(data.starts_with("[\n  {"));
        assert!(data.contains("\"code_type\": \"Function\""));

        let parsed: Vec<SemanticChunk> = serde_json::from_str(&data).unwrap();
        assert_eq!(parsed, chunks);
    }

    #[test]
    fn test_write_json_compact() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("chunks.json");
        write_json(&[chunk("run", "Function", "")], &path, true).unwrap();
        let data = fs::read_to_string(&path).unwrap();
        assert!(!data.contains('\n'));
        assert!(data.starts_with("[{\"name\":\"run\""));
    }

    #[test]
    fn test_empty_list_is_empty_array() {
        assert_eq!(to_json(&[], true).unwrap(), "[]");
        assert_eq!(to_json(&[], false).unwrap(), "[]");

        let temp = tempdir().unwrap();
        let path = temp.path().join("empty.json");
        write_json(&[], &path, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_write_json_to_unwritable_path() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("file");
        fs::write(&blocker, "x").unwrap();
        assert!(write_json(&[], blocker.join("chunks.json"), false).is_err());
    }

    #[test]
    fn test_output_stats() {
        let chunks = vec![
            chunk("a", "Function", "doc"),
            chunk("b", "Function", ""),
            chunk("C", "Class", "class doc"),
            chunk("m", "Method", ""),
        ];
        let stats = OutputStats::from_chunks(&chunks);
        assert_eq!(stats.total_chunks, 4);
        assert_eq!(stats.with_docstring, 2);
        assert_eq!(stats.by_type.get("Function"), Some(&2));
        assert_eq!(stats.by_type.get("Class"), Some(&1));
        assert_eq!(stats.by_type.get("Method"), Some(&1));

        let empty = OutputStats::from_chunks(&[]);
        assert_eq!(empty, OutputStats::default());
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["by_type"]["Function"], 2);
    }
}
