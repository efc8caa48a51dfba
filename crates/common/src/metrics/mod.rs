//! Metrics and observability utilities
//!
//! Prometheus metrics for the submission/review workflow with
//! standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all ReviewDesk metrics
pub const METRICS_PREFIX: &str = "reviewdesk";

/// Histogram buckets for request latency (in seconds)
/// Targets: P50 < 50ms, P99 < 150ms
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, // 1ms
    0.005, // 5ms
    0.010, // 10ms
    0.025, // 25ms
    0.050, // 50ms - P50 target
    0.075, // 75ms
    0.100, // 100ms
    0.150, // 150ms - P99 target
    0.250, // 250ms
    0.500, // 500ms
    1.000, // 1s
    2.500, // 2.5s
    5.000, // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_papers_submitted_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of papers submitted"
    );

    describe_counter!(
        format!("{}_status_transitions_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of paper status transitions"
    );

    describe_counter!(
        format!("{}_admin_overrides_total", METRICS_PREFIX),
        Unit::Count,
        "Forced status transitions performed by admins"
    );

    describe_counter!(
        format!("{}_reviewer_assignments_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of reviewer assignments"
    );

    describe_counter!(
        format!("{}_reviews_completed_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of completed reviews"
    );

    describe_counter!(
        format!("{}_revisions_submitted_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of submitted revisions"
    );
}

/// Record a paper submission
pub fn record_paper_submitted() {
    counter!(format!("{}_papers_submitted_total", METRICS_PREFIX)).increment(1);
}

/// Record a status transition with from/to labels
pub fn record_transition(from: &str, to: &str, forced: bool) {
    counter!(
        format!("{}_status_transitions_total", METRICS_PREFIX),
        "from" => from.to_string(),
        "to" => to.to_string(),
    )
    .increment(1);

    if forced {
        counter!(format!("{}_admin_overrides_total", METRICS_PREFIX)).increment(1);
    }
}

/// Record a reviewer assignment
pub fn record_reviewer_assigned() {
    counter!(format!("{}_reviewer_assignments_total", METRICS_PREFIX)).increment(1);
}

/// Record a completed review with its recommendation label
pub fn record_review_completed(recommendation: &str) {
    counter!(
        format!("{}_reviews_completed_total", METRICS_PREFIX),
        "recommendation" => recommendation.to_string(),
    )
    .increment(1);
}

/// Record a submitted revision
pub fn record_revision_submitted() {
    counter!(format!("{}_revisions_submitted_total", METRICS_PREFIX)).increment(1);
}

/// Timer helper for measuring operation duration
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Record the elapsed time into a histogram
    pub fn observe(self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        histogram!(self.name).record(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        register_metrics();
        register_metrics();
    }

    #[test]
    fn test_timer_observe() {
        let timer = Timer::new(format!("{}_request_duration_seconds", METRICS_PREFIX));
        timer.observe();
    }
}
