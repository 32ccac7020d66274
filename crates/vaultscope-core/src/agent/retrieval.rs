//! Retrieval: vault documents plus public sources, merged and ranked
//!
//! Both sources implement [`Retriever`], so a real literature backend can
//! replace [`ExternalLiteratureRetriever`] without touching the combiner or
//! the synthesis engine.

use super::scorer::{score_tokens, tokenize};
use super::types::{truncate_chars, RetrievalOptions, RetrievedChunk, SourceType};
use crate::db::VaultDocument;
use crate::error::Result;
use async_trait::async_trait;

/// Maximum snippet length for vault chunks
pub const VAULT_SNIPPET_MAX_CHARS: usize = 2000;

/// How much of the query the public stub echoes back
pub const PUBLIC_QUERY_ECHO_CHARS: usize = 80;

/// A source of scored chunks for a query
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Provenance tag stamped on every chunk this retriever returns
    fn source_type(&self) -> SourceType;

    /// Return at most `limit` chunks, best first
    async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<RetrievedChunk>>;
}

/// Rank vault documents by keyword overlap and return the top `limit` as chunks
pub fn retrieve_from_vault(
    query: &str,
    documents: &[VaultDocument],
    limit: usize,
) -> Vec<RetrievedChunk> {
    let query_tokens = tokenize(query);

    let mut scored: Vec<(&VaultDocument, f64)> = documents
        .iter()
        .map(|doc| {
            let text = format!("{} {}", doc.title, doc.content.as_deref().unwrap_or(""));
            (doc, score_tokens(&query_tokens, &text))
        })
        .collect();
    // sort_by is stable: ties keep store order
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(limit)
        .map(|(doc, score)| {
            let body = doc.content.as_deref().unwrap_or(&doc.title).trim();
            let snippet = if body.is_empty() {
                doc.title.clone()
            } else {
                truncate_chars(body, VAULT_SNIPPET_MAX_CHARS)
            };
            RetrievedChunk {
                source_type: SourceType::Vault,
                source_id: format!("vault:{}", doc.id),
                title: doc.title.clone(),
                url: doc.source_url.clone(),
                snippet,
                score,
            }
        })
        .collect()
}

/// Placeholder public-literature results that echo the query
pub fn retrieve_from_public_sources(query: &str, limit: usize) -> Vec<RetrievedChunk> {
    let echo = truncate_chars(query, PUBLIC_QUERY_ECHO_CHARS);
    let echo = echo.trim();

    let placeholders = [
        RetrievedChunk {
            source_type: SourceType::Public,
            source_id: "public:literature-overview".to_string(),
            title: format!("Literature overview: {}", echo),
            url: Some("https://example.com/source1".to_string()),
            snippet: format!(
                "Relevant discussion related to \"{}\". This is a placeholder from the public \
                 retrieval layer. Multiple studies suggest further investigation.",
                echo
            ),
            score: 0.85,
        },
        RetrievedChunk {
            source_type: SourceType::Public,
            source_id: "public:related-findings".to_string(),
            title: "Related findings".to_string(),
            url: Some("https://example.com/source2".to_string()),
            snippet: "Additional context for the query. Placeholder snippet until a real \
                      literature search backend is connected."
                .to_string(),
            score: 0.70,
        },
    ];

    placeholders.into_iter().take(limit).collect()
}

/// Concatenate vault then public chunks, rank by score and cap the total
pub fn merge_ranked(
    vault: Vec<RetrievedChunk>,
    public: Vec<RetrievedChunk>,
    max_total: usize,
) -> Vec<RetrievedChunk> {
    let mut combined = vault;
    combined.extend(public);
    combined.sort_by(|a, b| b.score.total_cmp(&a.score));
    combined.truncate(max_total);
    combined
}

/// Combined retrieval with the built-in vault ranking and public stub
pub fn retrieve(
    query: &str,
    documents: &[VaultDocument],
    options: &RetrievalOptions,
) -> Vec<RetrievedChunk> {
    let from_vault = retrieve_from_vault(query, documents, options.vault_limit);
    let from_public = retrieve_from_public_sources(query, options.public_limit);
    tracing::debug!(
        "Retrieved {} vault and {} public chunks",
        from_vault.len(),
        from_public.len()
    );
    merge_ranked(from_vault, from_public, options.max_total)
}

/// Combined retrieval over any pair of retrievers
pub async fn retrieve_with(
    query: &str,
    vault: &dyn Retriever,
    public: &dyn Retriever,
    options: &RetrievalOptions,
) -> Result<Vec<RetrievedChunk>> {
    let from_vault = vault.retrieve(query, options.vault_limit).await?;
    let from_public = public.retrieve(query, options.public_limit).await?;
    tracing::debug!(
        "Retrieved {} {} and {} {} chunks",
        from_vault.len(),
        vault.source_type().as_str(),
        from_public.len(),
        public.source_type().as_str()
    );
    Ok(merge_ranked(from_vault, from_public, options.max_total))
}

/// Retriever over an in-memory set of vault documents
pub struct VaultRetriever<'a> {
    documents: &'a [VaultDocument],
}

impl<'a> VaultRetriever<'a> {
    pub fn new(documents: &'a [VaultDocument]) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl<'a> Retriever for VaultRetriever<'a> {
    fn source_type(&self) -> SourceType {
        SourceType::Vault
    }

    async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<RetrievedChunk>> {
        Ok(retrieve_from_vault(query, self.documents, limit))
    }
}

/// Stand-in for an external literature search API
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalLiteratureRetriever;

#[async_trait]
impl Retriever for ExternalLiteratureRetriever {
    fn source_type(&self) -> SourceType {
        SourceType::Public
    }

    async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<RetrievedChunk>> {
        Ok(retrieve_from_public_sources(query, limit))
    }
}
