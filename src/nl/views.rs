/// Text and code views attached to each chunk for lexical/embedding search.
use super::tokenizer::{humanize, subtokenize, tokenize_for_text};
use crate::model::SemanticChunk;

/// The three derived fields of a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Views {
    pub text_view: String,
    pub code_view: String,
    pub ident_tokens: Vec<String>,
}

/// Builds the views of one chunk from its structural fields.
pub fn build_views(chunk: &SemanticChunk) -> Views {
    let ident_tokens = subtokenize(&chunk.name);
    let summary = build_summary(chunk, &ident_tokens);

    Views {
        text_view: tokenize_for_text(&summary),
        code_view: format!(
            "{}\n{}",
            chunk.signature.trim(),
            chunk.context.snippet.trim()
        ),
        ident_tokens,
    }
}

/// Fills `text_view`, `code_view` and `ident_tokens` in place.
pub fn enrich(chunk: &mut SemanticChunk) {
    let views = build_views(chunk);
    chunk.text_view = views.text_view;
    chunk.code_view = views.code_view;
    chunk.ident_tokens = views.ident_tokens;
}

pub fn enrich_all(chunks: &mut [SemanticChunk]) {
    chunks.iter_mut().for_each(enrich);
}

/// Natural-language summary before punctuation is stripped.
///
/// `<type> <name> [that does <doc>] defined as <signature> module <m> file <f>
/// original_name <raw name> original_signature <raw sig> identifiers <tokens>`
pub fn build_summary(chunk: &SemanticChunk, ident_tokens: &[String]) -> String {
    let name_h = humanize(&chunk.name);
    let sig_h = humanize(&chunk.signature);
    let doc = chunk.docstring.trim();
    let tokens = ident_tokens.join(" ");

    let mut parts = vec![chunk.code_type.trim(), name_h.trim()];
    if !doc.is_empty() {
        parts.extend(["that does", doc]);
    }
    parts.extend([
        "defined as",
        sig_h.trim(),
        "module",
        chunk.context.module.trim(),
        "file",
        chunk.context.file_name.trim(),
        "original_name",
        chunk.name.trim(),
        "original_signature",
        chunk.signature.trim(),
        "identifiers",
        tokens.as_str(),
    ]);

    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
