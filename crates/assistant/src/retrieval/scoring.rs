//! Lexical relevance scoring
//!
//! Scores a snippet against a question by weighted term overlap with a
//! bigram boost. Scores land in [0.0, 1.0] and are deterministic.

use std::collections::HashSet;

/// Words carrying no retrieval signal
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "in", "on", "at", "to", "for",
    "of", "with", "by", "from", "and", "or", "but", "not", "this", "that", "these", "those", "it",
    "its", "as", "do", "does", "did", "has", "have", "had", "can", "could", "will", "would",
    "should", "may", "might", "how", "what", "why", "when", "who", "i", "my", "me", "you", "your",
];

/// Normalize text into lowercase alphanumeric tokens, stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| w.len() > 1 && !is_stop_word(w))
        .collect()
}

/// Tokenize keeping duplicates out and order stable (first occurrence wins)
pub fn key_terms(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Verbs too generic to anchor a topic phrase
const GENERIC_VERBS: &[&str] = &[
    "implement", "use", "using", "make", "making", "get", "getting", "set", "setup", "enable",
    "work", "working", "fix", "fixing", "add",
];

/// Distill text into a short topic phrase of its leading key terms
pub fn topic(text: &str) -> String {
    key_terms(text)
        .into_iter()
        .filter(|t| !GENERIC_VERBS.contains(&t.as_str()))
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

fn bigrams(tokens: &[String]) -> HashSet<(String, String)> {
    tokens
        .windows(2)
        .map(|w| (w[0].clone(), w[1].clone()))
        .collect()
}

/// Score snippet text against pre-tokenized question terms.
///
/// 80% of the score is the fraction of question terms present in the
/// snippet; 20% rewards question bigrams appearing intact, so phrase
/// matches ("email verification") outrank scattered term hits.
pub fn score(question_tokens: &[String], snippet_text: &str) -> f32 {
    if question_tokens.is_empty() {
        return 0.0;
    }

    let snippet_tokens = tokenize(snippet_text);
    let snippet_set: HashSet<&String> = snippet_tokens.iter().collect();

    let matched = question_tokens
        .iter()
        .filter(|t| snippet_set.contains(t))
        .count();
    let term_fraction = matched as f32 / question_tokens.len() as f32;

    let question_bigrams = bigrams(question_tokens);
    let bigram_fraction = if question_bigrams.is_empty() {
        0.0
    } else {
        let snippet_bigrams = bigrams(&snippet_tokens);
        let hits = question_bigrams
            .iter()
            .filter(|b| snippet_bigrams.contains(b))
            .count();
        hits as f32 / question_bigrams.len() as f32
    };

    (term_fraction * 0.8 + bigram_fraction * 0.2).clamp(0.0, 1.0)
}
