//! Prometheus metrics for story lifecycle operations

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

static STORIES_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("stories_created_total", "Total number of stories created")
        .expect("failed to register stories_created_total")
});

/// View attempts by outcome (counted/expired/not_found)
static STORY_VIEWS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "story_views_total",
        "Story view attempts segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register story_views_total")
});

static STORIES_DELETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "stories_deleted_total",
        "Total number of stories deleted by their owner"
    )
    .expect("failed to register stories_deleted_total")
});

pub fn record_story_created() {
    STORIES_CREATED_TOTAL.inc();
}

pub fn record_story_view(outcome: &str) {
    STORY_VIEWS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_story_deleted() {
    STORIES_DELETED_TOTAL.inc();
}
