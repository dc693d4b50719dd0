//! Follow-up question generation
//!
//! Proposes related questions from the asked question's intent and key
//! terms, plus concepts surfaced by the retrieved context that the user has
//! not asked about yet. Output is deterministic: candidate overflow is
//! sampled with an explicitly seeded RNG.

use crate::retrieval::scoring;
use crate::retrieval::RankedSnippet;
use inkly_common::config::FollowupConfig;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;

/// Coarse question intent
#[derive(Debug, Clone, Copy, PartialEq)]
enum QuestionIntent {
    /// How-to / setup questions
    Procedural,
    /// Something is broken
    Troubleshooting,
    /// Definition / lookup questions
    Factual,
    /// Weighing options
    Comparison,
    /// Anything else
    General,
}

/// Generator for follow-up questions
pub struct FollowupGenerator {
    config: FollowupConfig,
}

impl FollowupGenerator {
    /// Create a new generator
    pub fn new(config: FollowupConfig) -> Self {
        Self { config }
    }

    /// Propose up to `max_followups` related questions.
    ///
    /// Candidates are deduplicated, interrogative, and never identical to
    /// the original question. Pure for identical inputs and seed.
    pub fn generate(
        &self,
        question: &str,
        answer_text: &str,
        context: &[RankedSnippet],
    ) -> Vec<String> {
        if self.config.max_followups == 0 {
            return vec![];
        }

        let intent = detect_intent(question);
        let topic = scoring::topic(question);
        let novel = novel_terms(question, answer_text, context);

        let mut candidates = templates_for(intent, &topic);
        for concept in &novel {
            candidates.push(format!("Can you tell me more about {concept}?"));
        }

        let filtered = self.filter(question, candidates);
        self.sample(filtered)
    }

    /// Dedup, drop the original question, keep interrogatives only
    fn filter(&self, question: &str, candidates: Vec<String>) -> Vec<String> {
        let original = normalize(question);
        let mut seen = HashSet::new();

        candidates
            .into_iter()
            .filter(|c| c.ends_with('?'))
            .filter(|c| normalize(c) != original)
            .filter(|c| seen.insert(normalize(c)))
            .collect()
    }

    /// Reduce overflow with a seeded shuffle, keeping original order among
    /// the survivors
    fn sample(&self, candidates: Vec<String>) -> Vec<String> {
        let max = self.config.max_followups;
        if candidates.len() <= max {
            return candidates;
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut indices: Vec<usize> = (0..candidates.len()).collect();
        indices.shuffle(&mut rng);
        indices.truncate(max);
        indices.sort_unstable();

        indices.into_iter().map(|i| candidates[i].clone()).collect()
    }
}

/// Classify the question with keyword heuristics
fn detect_intent(question: &str) -> QuestionIntent {
    let q = question.trim().to_lowercase();

    if q.contains(" vs ") || q.contains(" versus ") || q.contains("compare")
        || q.contains("difference between")
    {
        return QuestionIntent::Comparison;
    }

    if q.contains("not working") || q.contains("error") || q.contains("fails")
        || q.contains("failing") || q.contains("broken") || q.starts_with("why is")
        || q.starts_with("why does") || q.starts_with("why won")
    {
        return QuestionIntent::Troubleshooting;
    }

    if q.starts_with("how to") || q.starts_with("how do") || q.starts_with("how can")
        || q.contains("implement") || q.contains("set up") || q.contains("configure")
    {
        return QuestionIntent::Procedural;
    }

    if q.starts_with("what is") || q.starts_with("what are") || q.starts_with("who")
        || q.starts_with("when") || q.starts_with("define")
    {
        return QuestionIntent::Factual;
    }

    QuestionIntent::General
}

/// Terms surfaced by the retrieved context but absent from the question —
/// the concepts worth asking about next. Terms the answer already mentions
/// rank first.
fn novel_terms(question: &str, answer_text: &str, context: &[RankedSnippet]) -> Vec<String> {
    let question_tokens: HashSet<String> = scoring::tokenize(question).into_iter().collect();
    let answer_tokens: HashSet<String> = scoring::tokenize(answer_text).into_iter().collect();

    let mut pool = Vec::new();
    for ranked in context.iter().take(3) {
        pool.extend(scoring::key_terms(&ranked.snippet.text));
    }

    let mut seen = HashSet::new();
    let mut candidates: Vec<String> = pool
        .into_iter()
        .filter(|t| t.len() > 3 && !question_tokens.contains(t))
        .filter(|t| seen.insert(t.clone()))
        .collect();

    candidates.sort_by_key(|t| !answer_tokens.contains(t));
    candidates.truncate(2);
    candidates
}

fn templates_for(intent: QuestionIntent, topic: &str) -> Vec<String> {
    if topic.is_empty() {
        return vec![
            "Can you share more detail about what you are trying to do?".to_string(),
            "Which part of the product is this about?".to_string(),
        ];
    }

    match intent {
        QuestionIntent::Procedural => vec![
            format!("What are common mistakes when setting up {topic}?"),
            format!("How do I test {topic} before going live?"),
            format!("Which configuration options affect {topic}?"),
        ],
        QuestionIntent::Troubleshooting => vec![
            format!("What should I check first when {topic} fails?"),
            format!("How do I see recent errors related to {topic}?"),
            format!("How do I reset {topic} and start over?"),
        ],
        QuestionIntent::Factual => vec![
            format!("How do I get started with {topic}?"),
            format!("What are the limitations of {topic}?"),
        ],
        QuestionIntent::Comparison => vec![
            format!("What are the tradeoffs between the options for {topic}?"),
            format!("When is each option for {topic} the right choice?"),
        ],
        QuestionIntent::General => vec![
            format!("Can you give an example involving {topic}?"),
            format!("Where can I read more about {topic}?"),
        ],
    }
}

/// Case- and punctuation-insensitive comparison key
fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches(['?', '.', '!'])
        .to_lowercase()
}
