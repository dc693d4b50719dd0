//! Inkly Assistant Engine
//!
//! Retrieval-augmented, stateful question answering:
//! - Context store interface (+ in-memory implementation)
//! - Lexical retrieval with thresholding and a time budget
//! - Extractive answer synthesis with calibrated confidence
//! - Deterministic follow-up question generation
//! - Append-only conversation ledger

pub mod assistant;
pub mod followup;
pub mod ledger;
pub mod retrieval;
pub mod store;
pub mod synthesis;

// Re-export the public surface
pub use assistant::Assistant;
pub use followup::FollowupGenerator;
pub use ledger::{ConversationLedger, Exchange, Question};
pub use retrieval::{RankedSnippet, Retriever};
pub use store::{ContextSnippet, ContextStore, MemoryContextStore};
pub use synthesis::{Answer, Synthesizer};

// Re-export the shared foundation
pub use inkly_common::{config::AssistantConfig, errors::AssistantError, errors::Result};
