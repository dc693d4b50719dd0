//! Conversation ledger
//!
//! Append-only record of question/answer exchanges. Appends are serialized
//! behind a write lock and positions are assigned under that lock, so
//! concurrent callers always observe a single total order with no lost or
//! duplicated entries. Reads return snapshots the caller can mutate freely.

use crate::synthesis::Answer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

/// An asked question as recorded in history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Raw question text (trimmed)
    pub text: String,

    /// Arrival timestamp
    pub asked_at: DateTime<Utc>,

    /// Conversation position, strictly increasing from 0
    pub position: u64,
}

/// One question paired with its answer; immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    /// Exchange ID
    pub id: Uuid,

    /// The question as asked
    pub question: Question,

    /// The produced answer
    pub answer: Answer,
}

/// Append-only, linearizable conversation record
#[derive(Default)]
pub struct ConversationLedger {
    entries: RwLock<Vec<Exchange>>,
}

impl ConversationLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one exchange. The position is assigned while the write lock
    /// is held, which makes concurrent appends linearizable.
    pub fn append(
        &self,
        text: impl Into<String>,
        asked_at: DateTime<Utc>,
        answer: Answer,
    ) -> Exchange {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        let exchange = Exchange {
            id: Uuid::new_v4(),
            question: Question {
                text: text.into(),
                asked_at,
                position: entries.len() as u64,
            },
            answer,
        };

        entries.push(exchange.clone());
        exchange
    }

    /// Snapshot of all exchanges in conversational order
    pub fn history(&self) -> Vec<Exchange> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of recorded exchanges
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// True when nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all recorded exchanges
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn answer(text: &str) -> Answer {
        Answer {
            text: text.to_string(),
            confidence: 0.5,
            follow_up_questions: vec![],
            context_used: vec![],
        }
    }

    #[test]
    fn test_append_assigns_increasing_positions() {
        let ledger = ConversationLedger::new();

        for i in 0..4u64 {
            let ex = ledger.append(format!("question {i}"), Utc::now(), answer("a"));
            assert_eq!(ex.question.position, i);
        }

        let history = ledger.history();
        assert_eq!(history.len(), 4);
        for (i, ex) in history.iter().enumerate() {
            assert_eq!(ex.question.position, i as u64);
        }
    }

    #[test]
    fn test_history_is_a_snapshot() {
        let ledger = ConversationLedger::new();
        ledger.append("q", Utc::now(), answer("a"));

        let mut snapshot = ledger.history();
        snapshot.clear();

        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_repeated_reads_identical() {
        let ledger = ConversationLedger::new();
        ledger.append("q1", Utc::now(), answer("a1"));
        ledger.append("q2", Utc::now(), answer("a2"));

        let first = ledger.history();
        let second = ledger.history();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.question.position, b.question.position);
        }
    }

    #[test]
    fn test_clear_resets() {
        let ledger = ConversationLedger::new();
        ledger.append("q", Utc::now(), answer("a"));
        ledger.clear();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let ledger = Arc::new(ConversationLedger::new());
        let mut handles = Vec::new();

        for i in 0..16 {
            let ledger = Arc::clone(&ledger);
            handles.push(std::thread::spawn(move || {
                ledger.append(format!("question {i}"), Utc::now(), answer("a"));
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let history = ledger.history();
        assert_eq!(history.len(), 16);

        // One total order: positions are exactly 0..16 with no gaps or dups.
        let mut positions: Vec<u64> = history.iter().map(|e| e.question.position).collect();
        positions.sort_unstable();
        assert_eq!(positions, (0..16).collect::<Vec<u64>>());
    }
}
