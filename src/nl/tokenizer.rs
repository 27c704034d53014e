/// Identifier tokenization for search views.
///
/// `humanize` turns a symbol name or signature into one readable phrase;
/// `subtokenize` explodes a name into scope, snake and camel pieces (with
/// lowercase variants) for lexical matching.
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Anything that is not an ASCII word character.
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

/// Scope and member-access separators found in C++ names.
const SCOPE_SEPARATORS: [&str; 3] = ["::", "->", "."];

/// Converts an identifier or signature into space-separated words,
/// keeping case and acronyms intact.
pub fn humanize(s: &str) -> String {
    split_words(&normalize_separators(s)).join(" ")
}

/// Returns the name itself, its lowercase form, and every underscore/camel
/// piece with its lowercase form, deduplicated in first-seen order.
pub fn subtokenize(s: &str) -> Vec<String> {
    let normalized = normalize_separators(s);
    let mut tokens = OrderedTokens::default();

    for raw in split_words(&normalized) {
        tokens.add_with_lower(raw);

        for part in raw.split('_').filter(|p| !p.is_empty()) {
            for piece in split_camel_case(part) {
                tokens.add_with_lower(piece);
            }
        }
    }

    tokens.into_vec()
}

/// Splits on non-word characters and rejoins with single spaces.
pub fn tokenize_for_text(s: &str) -> String {
    split_words(s).join(" ")
}

/// Splits at lower/digit→upper transitions and before the last capital of an
/// acronym run (`HTTPServer` → `HTTP`, `Server`).
pub fn split_camel_case(s: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = s.char_indices().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        let prev = chars[i - 1].1;
        let cur = chars[i].1;
        let next = chars.get(i + 1).map(|&(_, c)| c);

        let lower_to_upper = (prev.is_lowercase() || prev.is_ascii_digit()) && cur.is_uppercase();
        let acronym_end =
            prev.is_uppercase() && cur.is_uppercase() && next.is_some_and(char::is_lowercase);

        if lower_to_upper || acronym_end {
            let at = chars[i].0;
            pieces.push(&s[start..at]);
            start = at;
        }
    }

    if start < s.len() {
        pieces.push(&s[start..]);
    }
    pieces
}

fn normalize_separators(s: &str) -> String {
    SCOPE_SEPARATORS
        .iter()
        .fold(s.to_string(), |acc, sep| acc.replace(sep, " "))
}

fn split_words(s: &str) -> Vec<&str> {
    NON_WORD
        .split(s)
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .collect()
}

/// Insertion-ordered, case-sensitive token set.
#[derive(Default)]
struct OrderedTokens {
    seen: HashSet<String>,
    out: Vec<String>,
}

impl OrderedTokens {
    fn add(&mut self, token: &str) {
        if token.is_empty() || self.seen.contains(token) {
            return;
        }
        self.seen.insert(token.to_string());
        self.out.push(token.to_string());
    }

    fn add_with_lower(&mut self, token: &str) {
        self.add(token);
        self.add(&token.to_lowercase());
    }

    fn into_vec(self) -> Vec<String> {
        self.out
    }
}
