//! Metrics and observability utilities
//!
//! Provides metric registration and recording helpers over the `metrics`
//! facade. No exporter is wired in here: the library records into whatever
//! recorder the embedding application installs, and records no-ops otherwise.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Inkly assistant metrics
pub const METRICS_PREFIX: &str = "inkly";

/// SLO-aligned histogram buckets for answer latency (in seconds)
/// Targets: P50 < 50ms, P99 < 250ms for in-memory retrieval
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, // 1ms
    0.005, // 5ms
    0.010, // 10ms
    0.025, // 25ms
    0.050, // 50ms - P50 target
    0.100, // 100ms
    0.250, // 250ms - P99 target
    0.500, // 500ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Question metrics
    describe_counter!(
        format!("{}_questions_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of questions answered"
    );

    describe_counter!(
        format!("{}_questions_rejected_total", METRICS_PREFIX),
        Unit::Count,
        "Total questions rejected by input validation"
    );

    describe_histogram!(
        format!("{}_answer_latency_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end answer latency in seconds"
    );

    describe_histogram!(
        format!("{}_answer_confidence", METRICS_PREFIX),
        Unit::Count,
        "Confidence distribution of produced answers"
    );

    // Retrieval metrics
    describe_counter!(
        format!("{}_retrieval_timeouts_total", METRICS_PREFIX),
        Unit::Count,
        "Retrievals that exceeded their time budget"
    );

    describe_counter!(
        format!("{}_no_context_answers_total", METRICS_PREFIX),
        Unit::Count,
        "Answers produced without any supporting context"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record per-question metrics
pub struct QuestionMetrics {
    start: Instant,
}

impl QuestionMetrics {
    /// Start tracking a question
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Record completion of a successfully answered question
    pub fn finish(self, confidence: f32, context_used: usize) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(format!("{}_questions_total", METRICS_PREFIX)).increment(1);

        if context_used == 0 {
            counter!(format!("{}_no_context_answers_total", METRICS_PREFIX)).increment(1);
        }

        histogram!(format!("{}_answer_latency_seconds", METRICS_PREFIX)).record(duration);
        histogram!(format!("{}_answer_confidence", METRICS_PREFIX)).record(confidence as f64);
    }
}

/// Record a rejected question
pub fn record_rejected_question() {
    counter!(format!("{}_questions_rejected_total", METRICS_PREFIX)).increment(1);
}

/// Record a retrieval that ran out of budget
pub fn record_retrieval_timeout() {
    counter!(format!("{}_retrieval_timeouts_total", METRICS_PREFIX)).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_is_idempotent() {
        // Without an installed recorder these are no-ops; must not panic.
        register_metrics();
        register_metrics();
    }

    #[test]
    fn test_question_metrics_finish() {
        let m = QuestionMetrics::start();
        m.finish(0.8, 2);
        record_rejected_question();
        record_retrieval_timeout();
    }
}
