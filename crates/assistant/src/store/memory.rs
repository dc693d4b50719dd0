//! In-memory context store
//!
//! Backs tests and the CLI. Real deployments put an index or corpus search
//! service behind the same trait.

use super::{ContextSnippet, ContextStore};
use inkly_common::errors::Result;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory snippet store with a cheap term prefilter
#[derive(Default)]
pub struct MemoryContextStore {
    snippets: RwLock<Vec<ContextSnippet>>,
}

impl MemoryContextStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with snippets
    pub fn with_snippets(snippets: Vec<ContextSnippet>) -> Self {
        Self {
            snippets: RwLock::new(snippets),
        }
    }

    /// Add a snippet, returning its ID
    pub fn insert(&self, snippet: ContextSnippet) -> Uuid {
        let id = snippet.id;
        let mut guard = self.snippets.write().unwrap_or_else(|e| e.into_inner());
        guard.push(snippet);
        id
    }

    /// Number of stored snippets
    pub fn len(&self) -> usize {
        self.snippets
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// True when the store holds no snippets
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ContextStore for MemoryContextStore {
    async fn search(&self, query: &str) -> Result<Vec<ContextSnippet>> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|w| {
                w.chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect::<String>()
                    .to_lowercase()
            })
            .filter(|w| w.len() > 2)
            .collect();

        let guard = self.snippets.read().unwrap_or_else(|e| e.into_inner());

        if terms.is_empty() {
            return Ok(vec![]);
        }

        // Over-inclusive on purpose: any shared term makes a candidate.
        let candidates = guard
            .iter()
            .filter(|s| {
                let text = s.text.to_lowercase();
                let source = s.source.to_lowercase();
                terms.iter().any(|t| text.contains(t) || source.contains(t))
            })
            .cloned()
            .collect();

        Ok(candidates)
    }
}
