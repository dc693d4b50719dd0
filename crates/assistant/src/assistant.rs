//! Assistant orchestrator
//!
//! Composes retrieval, synthesis, follow-up generation, and the
//! conversation ledger into the public question-answering surface. Each
//! `answer_question` call is a self-contained transaction: retrieve,
//! synthesize, propose follow-ups, append, return.

use crate::followup::FollowupGenerator;
use crate::ledger::{ConversationLedger, Exchange};
use crate::retrieval::Retriever;
use crate::store::ContextStore;
use crate::synthesis::{Answer, Synthesizer};
use chrono::Utc;
use inkly_common::config::AssistantConfig;
use inkly_common::errors::{AssistantError, Result};
use inkly_common::metrics::{record_rejected_question, QuestionMetrics};
use inkly_common::MAX_QUESTION_LEN;
use std::sync::Arc;
use tracing::info;

/// Retrieval-augmented, stateful question-answering assistant.
///
/// One instance serves one conversation, but tolerates concurrent calls:
/// retrieval and synthesis run lock-free, and only the ledger append is
/// serialized.
pub struct Assistant {
    retriever: Retriever,
    synthesizer: Synthesizer,
    followups: FollowupGenerator,
    ledger: ConversationLedger,
    max_results: usize,
}

impl Assistant {
    /// Create an assistant over a context store
    pub fn new(store: Arc<dyn ContextStore>, config: AssistantConfig) -> Self {
        let max_results = config.retrieval.max_results;
        Self {
            retriever: Retriever::new(store, config.retrieval),
            synthesizer: Synthesizer::new(config.synthesis),
            followups: FollowupGenerator::new(config.followup),
            ledger: ConversationLedger::new(),
            max_results,
        }
    }

    /// Create an assistant from pre-built components
    pub fn from_parts(
        retriever: Retriever,
        synthesizer: Synthesizer,
        followups: FollowupGenerator,
        max_results: usize,
    ) -> Self {
        Self {
            retriever,
            synthesizer,
            followups,
            ledger: ConversationLedger::new(),
            max_results,
        }
    }

    /// Answer a question and record the exchange.
    ///
    /// Fails only on invalid input or, in strict synthesis mode, on missing
    /// context; neither failure is recorded in history. Retrieval timeouts
    /// degrade to a low-confidence answer instead of failing the call.
    pub async fn answer_question(&self, text: &str) -> Result<Answer> {
        let metrics = QuestionMetrics::start();

        let trimmed = text.trim();
        if trimmed.is_empty() {
            record_rejected_question();
            return Err(AssistantError::InvalidInput {
                message: "question text must not be empty".to_string(),
            });
        }
        if trimmed.chars().count() > MAX_QUESTION_LEN {
            record_rejected_question();
            return Err(AssistantError::InvalidInput {
                message: format!("question text exceeds {MAX_QUESTION_LEN} characters"),
            });
        }

        let asked_at = Utc::now();

        let context = self.retriever.retrieve(trimmed, self.max_results).await;

        let mut answer = self.synthesizer.synthesize(trimmed, &context)?;
        answer.follow_up_questions = self.followups.generate(trimmed, &answer.text, &context);

        let exchange = self.ledger.append(trimmed, asked_at, answer.clone());

        info!(
            question = %trimmed,
            position = exchange.question.position,
            confidence = answer.confidence,
            context_used = answer.context_used.len(),
            followups = answer.follow_up_questions.len(),
            "Question answered"
        );
        metrics.finish(answer.confidence, answer.context_used.len());

        Ok(answer)
    }

    /// Snapshot of all recorded exchanges, in conversational order
    pub fn get_conversation_history(&self) -> Vec<Exchange> {
        self.ledger.history()
    }

    /// Forget the conversation recorded so far
    pub fn reset(&self) {
        self.ledger.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ContextSnippet, MemoryContextStore};
    use uuid::Uuid;

    fn help_store() -> Arc<MemoryContextStore> {
        Arc::new(MemoryContextStore::with_snippets(vec![
            ContextSnippet {
                id: Uuid::from_u128(1),
                text: "Email verification sends a six digit code to the address on file. \
                       The code expires after ten minutes."
                    .to_string(),
                source: "help/email-verification".to_string(),
            },
            ContextSnippet {
                id: Uuid::from_u128(2),
                text: "If a verification code is rejected, request a new code and check \
                       the spam folder."
                    .to_string(),
                source: "help/troubleshooting".to_string(),
            },
            ContextSnippet {
                id: Uuid::from_u128(3),
                text: "Notes sync across devices once the account is verified.".to_string(),
                source: "help/sync".to_string(),
            },
        ]))
    }

    fn assistant() -> Assistant {
        Assistant::new(help_store(), AssistantConfig::default())
    }

    #[tokio::test]
    async fn test_answer_confidence_in_unit_range() {
        let assistant = assistant();
        let answer = assistant
            .answer_question("How does email verification work?")
            .await
            .unwrap();

        assert!((0.0..=1.0).contains(&answer.confidence));
        assert!(!answer.text.is_empty());
        assert!(!answer.context_used.is_empty());
    }

    #[tokio::test]
    async fn test_empty_question_rejected_without_history_entry() {
        let assistant = assistant();

        let err = assistant.answer_question("   ").await.unwrap_err();
        assert!(matches!(err, AssistantError::InvalidInput { .. }));
        assert!(assistant.get_conversation_history().is_empty());
    }

    #[tokio::test]
    async fn test_overlong_question_rejected() {
        let assistant = assistant();
        let question = "a".repeat(MAX_QUESTION_LEN + 1);

        let err = assistant.answer_question(&question).await.unwrap_err();
        assert!(matches!(err, AssistantError::InvalidInput { .. }));
        assert!(assistant.get_conversation_history().is_empty());
    }

    #[tokio::test]
    async fn test_no_matching_context_yields_hedged_answer() {
        let assistant = Assistant::new(
            Arc::new(MemoryContextStore::new()),
            AssistantConfig::default(),
        );

        let question = "How do I implement email verification?";
        let answer = assistant.answer_question(question).await.unwrap();

        assert!(answer.confidence <= 0.2);
        assert!(answer.context_used.is_empty());
        for f in &answer.follow_up_questions {
            assert_ne!(f.trim_end_matches('?'), question.trim_end_matches('?'));
        }
        // Low confidence still records an exchange.
        assert_eq!(assistant.get_conversation_history().len(), 1);
    }

    #[tokio::test]
    async fn test_strict_mode_failure_leaves_history_untouched() {
        let config = AssistantConfig {
            synthesis: inkly_common::config::SynthesisConfig {
                strict: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let assistant = Assistant::new(Arc::new(MemoryContextStore::new()), config);

        let err = assistant
            .answer_question("How do I implement email verification?")
            .await
            .unwrap_err();

        assert!(matches!(err, AssistantError::InsufficientContext { .. }));
        assert!(assistant.get_conversation_history().is_empty());
    }

    #[tokio::test]
    async fn test_history_grows_in_call_order() {
        let assistant = assistant();
        let questions = [
            "How does email verification work?",
            "Why is my verification code not working?",
            "How do notes sync across devices?",
        ];

        for q in questions {
            assistant.answer_question(q).await.unwrap();
        }

        let history = assistant.get_conversation_history();
        assert_eq!(history.len(), questions.len());
        for (i, ex) in history.iter().enumerate() {
            assert_eq!(ex.question.text, questions[i]);
            assert_eq!(ex.question.position, i as u64);
        }
    }

    #[tokio::test]
    async fn test_history_read_is_idempotent() {
        let assistant = assistant();
        assistant
            .answer_question("How does email verification work?")
            .await
            .unwrap();

        let first = assistant.get_conversation_history();
        let second = assistant.get_conversation_history();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.question.text, b.question.text);
        }
    }

    #[tokio::test]
    async fn test_concurrent_questions_all_recorded() {
        let assistant = Arc::new(assistant());
        let mut handles = Vec::new();

        for i in 0..8 {
            let assistant = Arc::clone(&assistant);
            handles.push(tokio::spawn(async move {
                assistant
                    .answer_question(&format!("How does email verification work? attempt {i}"))
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let history = assistant.get_conversation_history();
        assert_eq!(history.len(), 8);

        let mut positions: Vec<u64> = history.iter().map(|e| e.question.position).collect();
        positions.sort_unstable();
        assert_eq!(positions, (0..8).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_reset_clears_history() {
        let assistant = assistant();
        assistant
            .answer_question("How does email verification work?")
            .await
            .unwrap();

        assistant.reset();
        assert!(assistant.get_conversation_history().is_empty());
    }

    #[tokio::test]
    async fn test_followups_within_configured_maximum() {
        let assistant = assistant();
        let answer = assistant
            .answer_question("Why is my verification code not working?")
            .await
            .unwrap();

        assert!(answer.follow_up_questions.len() <= 3);
    }
}
