//! Lexical relevance scoring
//!
//! Scores are the fraction of distinct query tokens that occur as substrings
//! of the lowercased document text. This is keyword overlap, not semantic
//! similarity: synonyms and paraphrases do not match, and a short token such
//! as "ai" also matches inside longer words like "said".

use std::collections::HashSet;

/// Combining diacritics stay attached to their letter, so lowercasing
/// "İ" to "i" plus U+0307 does not split a word.
fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

/// Split text into lowercase tokens on non-letter boundaries, dropping
/// tokens with fewer than two letters. Order of first appearance is kept.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.to_lowercase()
        .split(|c: char| !(c.is_alphabetic() || is_combining_mark(c)))
        .filter(|t| t.chars().filter(|c| c.is_alphabetic()).count() > 1)
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

/// Score pre-tokenized query terms against document text
pub fn score_tokens(query_tokens: &[String], document_text: &str) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let haystack = document_text.to_lowercase();
    let hits = query_tokens
        .iter()
        .filter(|t| haystack.contains(t.as_str()))
        .count();
    hits as f64 / query_tokens.len() as f64
}

/// Relevance of `document_text` to `query_text` in [0, 1]
pub fn score(query_text: &str, document_text: &str) -> f64 {
    score_tokens(&tokenize(query_text), document_text)
}
