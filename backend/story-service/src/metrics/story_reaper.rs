//! Prometheus metrics for the expired-story reaper
//!
//! Tracks reaper cycles, purged rows, and cycle duration

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};
use std::time::Duration;

/// Total number of reaper cycles run (success/error)
static REAPER_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "story_reaper_runs_total",
        "Total number of expired-story reaper cycles (success/error)",
        &["status"]
    )
    .expect("failed to register story_reaper_runs_total")
});

static REAPER_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "story_reaper_duration_seconds",
        "Duration of expired-story reaper cycles",
        &["status"],
        vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0]
    )
    .expect("failed to register story_reaper_duration_seconds")
});

static STORIES_PURGED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "story_reaper_purged_total",
        "Total expired stories removed by the reaper"
    )
    .expect("failed to register story_reaper_purged_total")
});

pub fn record_reaper_run(status: &str, duration: Duration) {
    REAPER_RUNS_TOTAL.with_label_values(&[status]).inc();
    REAPER_DURATION_SECONDS
        .with_label_values(&[status])
        .observe(duration.as_secs_f64());
}

pub fn record_stories_purged(count: u64) {
    STORIES_PURGED_TOTAL.inc_by(count);
}
