use super::source::{extract_docstring, extract_snippet};
use crate::model::{ChunkContext, SemanticChunk, SymbolNode};
use std::path::{Component, Path};

/// Per-file values shared by every chunk of one symbol tree.
struct FileContext<'a> {
    file_path: &'a str,
    file_name: String,
    module: String,
    lines: &'a [String],
}

/// Flattens a document-symbol tree into chunks, in pre-order.
///
/// Only extractable kinds become chunks, but every node's children are
/// visited. The nearest enclosing class/struct name is threaded down as
/// `struct_name`.
pub fn flatten_symbols(
    symbols: &[SymbolNode],
    file_path: &str,
    lines: &[String],
) -> Vec<SemanticChunk> {
    let path = Path::new(file_path);
    let file = FileContext {
        file_path,
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        module: module_name(path),
        lines,
    };

    let mut chunks = Vec::new();
    for symbol in symbols {
        visit(symbol, &file, "", &mut chunks);
    }
    chunks
}

fn visit(
    symbol: &SymbolNode,
    file: &FileContext<'_>,
    parent_struct: &str,
    chunks: &mut Vec<SemanticChunk>,
) {
    if symbol.kind.is_extractable() {
        chunks.push(build_chunk(symbol, file, parent_struct));
    }

    let child_struct = if symbol.kind.is_type_scope() {
        symbol.name.as_str()
    } else {
        parent_struct
    };

    for child in &symbol.children {
        visit(child, file, child_struct, chunks);
    }
}

fn build_chunk(
    symbol: &SymbolNode,
    file: &FileContext<'_>,
    parent_struct: &str,
) -> SemanticChunk {
    let start_line = symbol.range.start.line as usize;
    let end_line = symbol.range.end.line as usize;

    SemanticChunk {
        name: symbol.name.clone(),
        signature: signature(symbol).to_string(),
        code_type: symbol.kind.label().to_string(),
        docstring: extract_docstring(start_line, file.lines),
        line: start_line + 1,
        line_from: start_line + 1,
        line_to: end_line + 1,
        context: ChunkContext {
            module: file.module.clone(),
            file_path: file.file_path.to_string(),
            file_name: file.file_name.clone(),
            struct_name: parent_struct.to_string(),
            snippet: extract_snippet(&symbol.range, file.lines),
        },
        ..Default::default()
    }
}

fn signature(symbol: &SymbolNode) -> &str {
    if symbol.detail.is_empty() {
        &symbol.name
    } else {
        &symbol.detail
    }
}

/// Last segment of the file's directory (`"."` for a bare file name).
fn module_name(path: &Path) -> String {
    let Some(dir) = path.parent() else {
        return String::new();
    };
    if dir.as_os_str().is_empty() {
        return ".".to_string();
    }
    match dir.components().next_back() {
        Some(Component::Normal(name)) => name.to_string_lossy().into_owned(),
        Some(Component::CurDir) => ".".to_string(),
        Some(Component::ParentDir) => "..".to_string(),
        _ => String::new(),
    }
}
