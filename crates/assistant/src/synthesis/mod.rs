//! Answer synthesis
//!
//! Produces an answer draft from ranked context, extractively: the most
//! question-relevant sentences of the top snippets are stitched together
//! with inline [n] citations. Confidence is a deterministic blend of top
//! relevance, cross-snippet agreement, and question coverage.

use crate::retrieval::scoring;
use crate::retrieval::RankedSnippet;
use inkly_common::config::SynthesisConfig;
use inkly_common::errors::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Longest sentence considered quotable
const MAX_SENTENCE_LEN: usize = 400;

/// Synthesized answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text with inline [n] citations
    pub text: String,

    /// Confidence score (0.0 - 1.0); 0.0 signals "no supporting context"
    pub confidence: f32,

    /// Suggested follow-up questions (filled by the follow-up generator)
    pub follow_up_questions: Vec<String>,

    /// IDs of the context snippets cited in the answer
    pub context_used: Vec<Uuid>,
}

/// Synthesizer for drafting answers from retrieved context
pub struct Synthesizer {
    config: SynthesisConfig,
}

impl Synthesizer {
    /// Create a new synthesizer
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    /// Synthesize an answer for `question` from ranked context.
    ///
    /// With no usable context: strict mode fails with
    /// `InsufficientContext`; default mode returns a hedged answer whose
    /// confidence never exceeds the configured ceiling.
    pub fn synthesize(&self, question: &str, ranked: &[RankedSnippet]) -> Result<Answer> {
        if ranked.is_empty() {
            if self.config.strict {
                return Err(AssistantError::InsufficientContext {
                    query: question.to_string(),
                });
            }

            // Zero is the reserved "no supporting context" signal; hedged
            // answers must also stay under the configured ceiling.
            let confidence = 0.0_f32.min(self.config.no_context_confidence_ceiling);
            return Ok(Answer {
                text: self.hedged_answer(question),
                confidence,
                follow_up_questions: vec![],
                context_used: vec![],
            });
        }

        let question_tokens = scoring::tokenize(question);
        let quoted = &ranked[..ranked.len().min(self.config.max_answer_snippets)];

        let text = self.draft(&question_tokens, quoted);
        let context_used = extract_citation_ids(&text, quoted);

        let top_score = ranked[0].score;
        let agreements = count_agreements(&text, ranked);
        let coverage = coverage_fraction(&question_tokens, &text);
        let mut confidence = confidence_score(top_score, agreements, coverage);

        // An answer that ended up citing nothing counts as unsupported.
        if context_used.is_empty() {
            confidence = confidence.min(self.config.no_context_confidence_ceiling);
        }

        Ok(Answer {
            text,
            confidence,
            follow_up_questions: vec![],
            context_used,
        })
    }

    /// Stitch the most relevant sentence of each quoted snippet into a
    /// cited draft
    fn draft(&self, question_tokens: &[String], quoted: &[RankedSnippet]) -> String {
        let mut parts = Vec::new();

        for (i, ranked) in quoted.iter().enumerate() {
            let sentence = best_sentence(question_tokens, &ranked.snippet.text);
            let clean = sentence.trim().trim_end_matches(['.', '!', '?']);
            if clean.is_empty() {
                continue;
            }
            parts.push(format!("{} [{}]", clean, i + 1));
        }

        let mut text = parts.join(". ");
        text.push('.');
        text
    }

    /// Fallback answer when nothing in the store supports the question
    fn hedged_answer(&self, question: &str) -> String {
        let topic = scoring::topic(question);
        if topic.is_empty() {
            "I couldn't find anything in the knowledge base to answer that. \
             Try rephrasing the question or asking about a more specific feature."
                .to_string()
        } else {
            format!(
                "I couldn't find anything in the knowledge base about {topic}. \
                 Try rephrasing the question or asking about a more specific feature."
            )
        }
    }
}

/// Pick the sentence most relevant to the question; falls back to the
/// snippet's opening sentence when no sentence shares a term
fn best_sentence(question_tokens: &[String], text: &str) -> String {
    let sentences = split_sentences(text);

    let best = sentences
        .iter()
        .filter(|s| s.len() <= MAX_SENTENCE_LEN)
        .map(|s| {
            let lower = s.to_lowercase();
            let hits = question_tokens
                .iter()
                .filter(|t| lower.contains(t.as_str()))
                .count();
            (hits, s)
        })
        .max_by_key(|(hits, _)| *hits);

    match best {
        Some((hits, s)) if hits > 0 => (*s).clone(),
        _ => sentences
            .first()
            .cloned()
            .unwrap_or_else(|| text.chars().take(MAX_SENTENCE_LEN).collect()),
    }
}

/// Split text into sentences on terminal punctuation
fn split_sentences(text: &str) -> Vec<String> {
    let delimiters = ['.', '?', '!'];
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if delimiters.contains(&ch) {
            let trimmed = current.trim().to_string();
            if !trimmed.is_empty() {
                sentences.push(trimmed);
            }
            current.clear();
        }
    }

    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }

    sentences
}

/// Map [n] markers in the draft back to snippet IDs, in citation order
fn extract_citation_ids(text: &str, quoted: &[RankedSnippet]) -> Vec<Uuid> {
    let pattern = regex_lite::Regex::new(r"\[(\d+)\]").unwrap();
    let mut ids = Vec::new();

    for cap in pattern.captures_iter(text) {
        if let Some(num) = cap.get(1) {
            if let Ok(idx) = num.as_str().parse::<usize>() {
                if idx > 0 && idx <= quoted.len() {
                    let id = quoted[idx - 1].snippet.id;
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
        }
    }

    ids
}

/// Count snippets beyond the first whose text supports the draft
fn count_agreements(draft: &str, ranked: &[RankedSnippet]) -> usize {
    let draft_tokens: HashSet<String> = scoring::tokenize(draft).into_iter().collect();

    ranked
        .iter()
        .skip(1)
        .filter(|r| {
            let overlap = scoring::tokenize(&r.snippet.text)
                .into_iter()
                .filter(|t| draft_tokens.contains(t))
                .collect::<HashSet<_>>()
                .len();
            overlap >= 2
        })
        .count()
}

/// Fraction of question vocabulary covered by the draft
fn coverage_fraction(question_tokens: &[String], draft: &str) -> f32 {
    if question_tokens.is_empty() {
        return 0.0;
    }
    let draft_tokens: HashSet<String> = scoring::tokenize(draft).into_iter().collect();
    let covered = question_tokens
        .iter()
        .filter(|t| draft_tokens.contains(*t))
        .count();
    covered as f32 / question_tokens.len() as f32
}

/// Deterministic confidence blend.
///
/// Monotonic non-decreasing in `top_score` and in `agreements`; the
/// agreement factor saturates as more snippets concur.
fn confidence_score(top_score: f32, agreements: usize, coverage: f32) -> f32 {
    let agreement_factor = 1.0 - 1.0 / (1.0 + agreements as f32);
    (0.55 * top_score + 0.35 * agreement_factor + 0.10 * coverage).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ContextSnippet;

    fn ranked(id: u128, text: &str, score: f32) -> RankedSnippet {
        RankedSnippet {
            snippet: ContextSnippet {
                id: Uuid::from_u128(id),
                text: text.to_string(),
                source: "help/test".to_string(),
            },
            score,
        }
    }

    fn synthesizer() -> Synthesizer {
        Synthesizer::new(SynthesisConfig::default())
    }

    #[test]
    fn test_answer_cites_context() {
        let context = vec![
            ranked(1, "Email verification sends a six digit code. Codes expire after ten minutes.", 0.8),
            ranked(2, "Verification emails may land in spam folders.", 0.5),
        ];

        let answer = synthesizer()
            .synthesize("How does email verification work?", &context)
            .unwrap();

        assert!(answer.text.contains("[1]"));
        assert_eq!(answer.context_used[0], Uuid::from_u128(1));
        assert!(answer.confidence > 0.0 && answer.confidence <= 1.0);
    }

    #[test]
    fn test_no_context_hedges_with_low_confidence() {
        let answer = synthesizer()
            .synthesize("How do I implement email verification?", &[])
            .unwrap();

        assert!(answer.confidence <= 0.2);
        assert!(answer.context_used.is_empty());
        assert!(!answer.text.is_empty());
    }

    #[test]
    fn test_strict_mode_fails_without_context() {
        let strict = Synthesizer::new(SynthesisConfig {
            strict: true,
            ..SynthesisConfig::default()
        });

        let err = strict
            .synthesize("How do I implement email verification?", &[])
            .unwrap_err();

        assert!(matches!(err, AssistantError::InsufficientContext { .. }));
    }

    #[test]
    fn test_confidence_monotonic_in_top_score() {
        let mut prev = 0.0;
        for step in 0..=10 {
            let top = step as f32 / 10.0;
            let c = confidence_score(top, 1, 0.5);
            assert!(c >= prev);
            prev = c;
        }
    }

    #[test]
    fn test_confidence_monotonic_in_agreements() {
        let mut prev = 0.0;
        for agreements in 0..8 {
            let c = confidence_score(0.6, agreements, 0.5);
            assert!(c >= prev);
            prev = c;
        }
    }

    #[test]
    fn test_confidence_bounded() {
        assert!(confidence_score(1.0, 100, 1.0) <= 1.0);
        assert!(confidence_score(0.0, 0, 0.0) >= 0.0);
    }

    #[test]
    fn test_agreeing_snippets_raise_confidence() {
        let lone = vec![ranked(1, "Verification codes expire after ten minutes.", 0.7)];
        let supported = vec![
            ranked(1, "Verification codes expire after ten minutes.", 0.7),
            ranked(2, "Expired verification codes are rejected; request a new code.", 0.6),
            ranked(3, "A verification code is valid for ten minutes.", 0.5),
        ];

        let s = synthesizer();
        let a = s.synthesize("Why is my verification code not working?", &lone).unwrap();
        let b = s
            .synthesize("Why is my verification code not working?", &supported)
            .unwrap();

        assert!(b.confidence >= a.confidence);
    }

    #[test]
    fn test_citation_extraction_handles_out_of_range() {
        let context = vec![ranked(1, "Only one snippet here.", 0.9)];
        let ids = extract_citation_ids("Claim [1]. Bogus [4].", &context);
        assert_eq!(ids, vec![Uuid::from_u128(1)]);
    }

    #[test]
    fn test_sentence_splitting() {
        let sentences = split_sentences("First sentence. Second sentence! Third?");
        assert_eq!(sentences.len(), 3);
    }
}
