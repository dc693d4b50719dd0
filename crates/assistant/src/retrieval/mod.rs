//! Retrieval over the context store
//!
//! The retriever turns an opaque store search into a ranked, thresholded,
//! deterministic result set. It never fails the enclosing question: a slow
//! or broken store degrades to whatever was gathered before the deadline.

pub mod scoring;

use crate::store::{ContextSnippet, ContextStore};
use inkly_common::config::RetrievalConfig;
use inkly_common::metrics::record_retrieval_timeout;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// A snippet paired with its relevance score for one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSnippet {
    /// The retrieved snippet
    pub snippet: ContextSnippet,

    /// Relevance score (0.0 - 1.0), assigned at retrieval time
    pub score: f32,
}

/// Retriever applying scoring, thresholding, and a time budget
pub struct Retriever {
    store: Arc<dyn ContextStore>,
    config: RetrievalConfig,
}

impl Retriever {
    /// Create a new retriever over a context store
    pub fn new(store: Arc<dyn ContextStore>, config: RetrievalConfig) -> Self {
        Self { store, config }
    }

    /// Retrieve up to `k` snippets relevant to `question`.
    ///
    /// Results are sorted by score descending, ties broken by snippet ID
    /// ascending. An empty result means "no relevant context", not an
    /// error; timeouts and store failures also land here.
    pub async fn retrieve(&self, question: &str, k: usize) -> Vec<RankedSnippet> {
        let budget = Duration::from_millis(self.config.timeout_ms);

        let candidates = match tokio::time::timeout(budget, self.store.search(question)).await {
            Ok(Ok(snippets)) => snippets,
            Ok(Err(e)) => {
                warn!(error = %e, "Context store search failed, continuing without context");
                vec![]
            }
            Err(_) => {
                record_retrieval_timeout();
                warn!(
                    timeout_ms = self.config.timeout_ms,
                    "Retrieval timed out, continuing with partial results"
                );
                vec![]
            }
        };

        self.rank(question, candidates, k)
    }

    /// Score, threshold, order, and truncate candidates
    fn rank(&self, question: &str, candidates: Vec<ContextSnippet>, k: usize) -> Vec<RankedSnippet> {
        let question_tokens = scoring::tokenize(question);

        let mut ranked: Vec<RankedSnippet> = candidates
            .into_iter()
            .map(|snippet| {
                let score = scoring::score(&question_tokens, &snippet.text);
                RankedSnippet { snippet, score }
            })
            .filter(|r| r.score >= self.config.min_score)
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.snippet.id.cmp(&b.snippet.id))
        });

        ranked.truncate(k);
        ranked
    }
}
