//! Citation extraction from synthesized sections

use super::types::{truncate_chars, CitationRecord, RetrievedChunk};
use std::collections::{HashMap, HashSet};

/// Maximum snippet length stored on a citation
pub const CITATION_SNIPPET_MAX_CHARS: usize = 1000;

/// One citation per unique source id referenced by the sections.
///
/// Records come out in order of each source's first chunk; when several
/// chunks share a source id, the last one wins. Referenced ids that match no
/// chunk are skipped.
pub fn extract_citations(chunks: &[RetrievedChunk], used_source_ids: &[String]) -> Vec<CitationRecord> {
    let used: HashSet<&str> = used_source_ids.iter().map(String::as_str).collect();

    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &RetrievedChunk> = HashMap::new();
    for chunk in chunks {
        let key = chunk.source_id.as_str();
        if !used.contains(key) {
            continue;
        }
        if latest.insert(key, chunk).is_none() {
            order.push(key);
        }
    }

    order
        .into_iter()
        .filter_map(|key| latest.get(key))
        .map(|chunk| CitationRecord {
            source_id: chunk.source_id.clone(),
            title: chunk.title.clone(),
            url: chunk.url.clone(),
            snippet: truncate_chars(&chunk.snippet, CITATION_SNIPPET_MAX_CHARS),
        })
        .collect()
}
