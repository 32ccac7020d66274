//! Synthesis engine: grounded sections, summary and confidence

use super::types::{truncate_chars, RetrievedChunk, SynthesisOutput, SynthesisSection};
use std::collections::{HashMap, HashSet};

/// Query characters shown in the summary line
pub const SUMMARY_QUERY_MAX_CHARS: usize = 100;

/// Maximum body length of one section
pub const SECTION_TEXT_MAX_CHARS: usize = 3000;

/// Confidence floor once any evidence exists
const BASE_CONFIDENCE: f64 = 0.3;
/// Weight of source diversity
const SOURCE_WEIGHT: f64 = 0.4;
/// Weight of mean chunk relevance
const RELEVANCE_WEIGHT: f64 = 0.3;
/// Distinct sources at which the diversity factor saturates
const SOURCE_SATURATION: f64 = 5.0;

fn distinct_sources(chunks: &[RetrievedChunk]) -> usize {
    chunks
        .iter()
        .map(|c| c.source_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

fn build_summary(query: &str, chunks: &[RetrievedChunk]) -> String {
    let shown = truncate_chars(query, SUMMARY_QUERY_MAX_CHARS);
    let ellipsis = if query.chars().count() > SUMMARY_QUERY_MAX_CHARS {
        "..."
    } else {
        ""
    };
    format!(
        "Summary for: \"{}{}\". Synthesized from {} chunk(s) across {} source(s).",
        shown,
        ellipsis,
        chunks.len(),
        distinct_sources(chunks)
    )
}

/// One section per source id, in order of first appearance
fn build_sections(chunks: &[RetrievedChunk]) -> Vec<SynthesisSection> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&RetrievedChunk>> = HashMap::new();
    for chunk in chunks {
        let key = chunk.source_id.as_str();
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(chunk);
    }

    order
        .iter()
        .enumerate()
        .filter_map(|(i, key)| {
            let group = groups.get(key)?;
            let first = group.first()?;
            let heading = if first.title.is_empty() {
                format!("Source {}", i + 1)
            } else {
                first.title.clone()
            };
            let joined = group
                .iter()
                .map(|c| c.snippet.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            Some(SynthesisSection {
                heading,
                text: truncate_chars(&joined, SECTION_TEXT_MAX_CHARS),
                source_ids: group.iter().map(|c| c.source_id.clone()).collect(),
            })
        })
        .collect()
}

/// Confidence in [0, 1] from source diversity and mean relevance.
///
/// `0.3 + min(1, sources / 5) * 0.4 + mean_score * 0.3`, clamped; an empty
/// chunk set is 0.
pub fn compute_confidence(chunks: &[RetrievedChunk]) -> f64 {
    if chunks.is_empty() {
        return 0.0;
    }
    let source_factor = (distinct_sources(chunks) as f64 / SOURCE_SATURATION).min(1.0) * SOURCE_WEIGHT;
    let mean_score = chunks.iter().map(|c| c.score).sum::<f64>() / chunks.len() as f64;
    let relevance_factor = mean_score * RELEVANCE_WEIGHT;
    (BASE_CONFIDENCE + source_factor + relevance_factor).clamp(0.0, 1.0)
}

/// Turn ranked chunks into a summary, grounded sections and a confidence score
pub fn synthesize(query: &str, chunks: &[RetrievedChunk]) -> SynthesisOutput {
    let output = SynthesisOutput {
        summary: build_summary(query, chunks),
        sections: build_sections(chunks),
        confidence: compute_confidence(chunks),
    };
    tracing::debug!(
        "Synthesized {} section(s), confidence {:.3}",
        output.sections.len(),
        output.confidence
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::SourceType;
    use proptest::prelude::*;

    fn chunk(source_id: &str, title: &str, snippet: &str, score: f64) -> RetrievedChunk {
        RetrievedChunk {
            source_type: if source_id.starts_with("vault:") {
                SourceType::Vault
            } else {
                SourceType::Public
            },
            source_id: source_id.to_string(),
            title: title.to_string(),
            url: None,
            snippet: snippet.to_string(),
            score,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_confidence_empty_is_zero() {
        assert_eq!(compute_confidence(&[]), 0.0);
    }

    #[test]
    fn test_confidence_formula() {
        // one source, score 1.0: 0.3 + 0.2*0.4 + 1.0*0.3
        let one = [chunk("vault:1", "A", "a", 1.0)];
        assert!(approx(compute_confidence(&one), 0.68));

        // two sources, mean 0.5: 0.3 + 0.4*0.4 + 0.5*0.3
        let two = [chunk("vault:1", "A", "a", 0.2), chunk("vault:2", "B", "b", 0.8)];
        assert!(approx(compute_confidence(&two), 0.61));

        // zero relevance still earns the floor plus diversity
        let zero = [chunk("vault:1", "A", "a", 0.0)];
        assert!(approx(compute_confidence(&zero), 0.38));
    }

    #[test]
    fn test_confidence_source_factor_saturates() {
        let five: Vec<_> = (0..5)
            .map(|i| chunk(&format!("vault:{}", i), "t", "s", 1.0))
            .collect();
        let seven: Vec<_> = (0..7)
            .map(|i| chunk(&format!("vault:{}", i), "t", "s", 1.0))
            .collect();
        assert!(approx(compute_confidence(&five), 1.0));
        assert!(approx(compute_confidence(&seven), 1.0));
    }

    #[test]
    fn test_confidence_duplicate_sources_count_once() {
        let chunks = [chunk("vault:1", "A", "a", 0.5), chunk("vault:1", "A", "b", 0.5)];
        assert!(approx(compute_confidence(&chunks), 0.3 + 0.08 + 0.15));
    }

    #[test]
    fn test_sections_group_by_source_in_first_appearance_order() {
        let chunks = [
            chunk("public:literature-overview", "Overview", "p1", 0.85),
            chunk("vault:2", "Notes", "v1", 0.5),
            chunk("public:literature-overview", "Overview again", "p2", 0.4),
        ];
        let out = synthesize("q", &chunks);
        assert_eq!(out.sections.len(), 2);
        assert_eq!(out.sections[0].heading, "Overview");
        assert_eq!(out.sections[0].text, "p1\n\np2");
        assert_eq!(
            out.sections[0].source_ids,
            vec!["public:literature-overview", "public:literature-overview"]
        );
        assert_eq!(out.sections[1].heading, "Notes");
        assert_eq!(out.sections[1].source_ids, vec!["vault:2"]);
    }

    #[test]
    fn test_section_heading_fallback_uses_position() {
        let chunks = [chunk("vault:1", "Titled", "a", 0.5), chunk("vault:2", "", "b", 0.5)];
        let out = synthesize("q", &chunks);
        assert_eq!(out.sections[1].heading, "Source 2");
    }

    #[test]
    fn test_section_text_truncated() {
        let long = "y".repeat(2000);
        let chunks = [
            chunk("vault:1", "A", &long, 0.5),
            chunk("vault:1", "A", &long, 0.5),
        ];
        let out = synthesize("q", &chunks);
        assert_eq!(out.sections[0].text.chars().count(), SECTION_TEXT_MAX_CHARS);
    }

    #[test]
    fn test_summary_counts_and_ellipsis() {
        let chunks = [
            chunk("vault:1", "A", "a", 0.5),
            chunk("vault:1", "A", "b", 0.5),
            chunk("public:related-findings", "B", "c", 0.7),
        ];
        let out = synthesize("short query", &chunks);
        assert_eq!(
            out.summary,
            "Summary for: \"short query\". Synthesized from 3 chunk(s) across 2 source(s)."
        );

        let long_query = "q".repeat(150);
        let out = synthesize(&long_query, &chunks);
        assert!(out.summary.contains(&format!("{}...\"", "q".repeat(100))));
        assert!(!out.summary.contains(&"q".repeat(101)));
    }

    #[test]
    fn test_zero_chunks() {
        let out = synthesize("nothing found", &[]);
        assert!(out.summary.contains("0 source(s)"));
        assert!(out.sections.is_empty());
        assert_eq!(out.confidence, 0.0);
    }

    fn arb_chunks() -> impl Strategy<Value = Vec<RetrievedChunk>> {
        prop::collection::vec((0u8..8, 0.0f64..=1.0), 0..20).prop_map(|items| {
            items
                .into_iter()
                .map(|(src, score)| chunk(&format!("vault:{}", src), "t", "s", score))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_confidence_in_unit_interval(chunks in arb_chunks()) {
            let c = compute_confidence(&chunks);
            prop_assert!((0.0..=1.0).contains(&c));
        }

        #[test]
        fn prop_new_source_never_lowers_confidence(
            chunks in arb_chunks(),
            score in 0.0f64..=1.0,
        ) {
            // Holds for a new source scored at least the current mean; a
            // low-scoring chunk past saturation can pull the mean down.
            let mean = if chunks.is_empty() {
                0.0
            } else {
                chunks.iter().map(|c| c.score).sum::<f64>() / chunks.len() as f64
            };
            let new_score = score.max(mean);
            let mut extended = chunks.clone();
            extended.push(chunk("vault:fresh", "t", "s", new_score));
            prop_assert!(compute_confidence(&extended) + 1e-12 >= compute_confidence(&chunks));
        }
    }
}
