use crate::model::Range;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Doc-comment prefixes recognised above a symbol.
const DOC_PREFIXES: [&str; 2] = ["///", "//!"];

/// Reads a file into 0-indexed lines. An unreadable file yields no lines.
pub fn read_source_lines<P: AsRef<Path>>(filepath: P) -> Vec<String> {
    let filepath = filepath.as_ref();
    match fs::read(filepath) {
        Ok(bytes) => String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect(),
        Err(e) => {
            debug!("cannot read {}: {e}", filepath.display());
            Vec::new()
        }
    }
}

/// Collects the `///` / `//!` block directly above `start_line`.
///
/// Blank lines are skipped while scanning upward; the first other line ends
/// the block. Lines come back top-down, joined by single spaces.
pub fn extract_docstring(start_line: usize, lines: &[String]) -> String {
    if start_line == 0 || start_line > lines.len() {
        return String::new();
    }

    let mut doc_lines = Vec::new();
    for raw in lines[..start_line].iter().rev() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match DOC_PREFIXES.iter().find_map(|p| line.strip_prefix(p)) {
            Some(doc) => doc_lines.push(doc.trim()),
            None => break,
        }
    }

    doc_lines.reverse();
    doc_lines.join(" ")
}

/// Source text of the lines covered by `range` (inclusive), or empty when the
/// range does not fit inside `lines`.
pub fn extract_snippet(range: &Range, lines: &[String]) -> String {
    let start = range.start.line as usize;
    let end = range.end.line as usize;

    if end >= lines.len() || start > end {
        return String::new();
    }

    lines[start..=end].join("\n")
}
