//! Context store interface
//!
//! The store is the assistant's window onto retrievable knowledge. It is an
//! external collaborator: the engine only requires an opaque `search` that
//! returns candidate snippets, ranked or not. Relevance scoring and
//! thresholding happen in the retriever, never here.

mod memory;

pub use memory::MemoryContextStore;

use inkly_common::errors::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A retrievable unit of background knowledge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSnippet {
    /// Snippet ID
    pub id: Uuid,

    /// Snippet text body
    pub text: String,

    /// Where this snippet came from (doc slug, help article, etc.)
    pub source: String,
}

impl ContextSnippet {
    /// Create a snippet with a fresh ID
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            source: source.into(),
        }
    }
}

/// Read-only provider of retrievable context snippets
#[async_trait::async_trait]
pub trait ContextStore: Send + Sync {
    /// Return candidate snippets for a query. Candidates may be unranked
    /// and over-inclusive; the retriever filters and orders them.
    async fn search(&self, query: &str) -> Result<Vec<ContextSnippet>>;
}
