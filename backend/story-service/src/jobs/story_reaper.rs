//! Expired-story reaper
//!
//! Reads already hide expired stories; this job only deletes the rows so the
//! table does not grow without bound. Disabled unless `STORY_REAPER_ENABLED=true`.

use crate::metrics::story_reaper as metrics;
use crate::services::StoriesService;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Default check interval (5 minutes)
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub struct StoryReaper {
    service: StoriesService,
    interval: Duration,
}

impl StoryReaper {
    pub fn new(service: StoriesService, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Run one purge cycle. Returns rows removed.
    pub async fn run_once(&self) -> crate::Result<u64> {
        let cycle_start = Instant::now();

        match self.service.purge_expired().await {
            Ok(purged) => {
                metrics::record_reaper_run("success", cycle_start.elapsed());
                if purged > 0 {
                    metrics::record_stories_purged(purged);
                    tracing::info!(
                        purged,
                        duration_ms = cycle_start.elapsed().as_millis() as u64,
                        "expired stories purged"
                    );
                }
                Ok(purged)
            }
            Err(e) => {
                metrics::record_reaper_run("error", cycle_start.elapsed());
                tracing::error!(error = %e, duration_ms = cycle_start.elapsed().as_millis() as u64, "story purge failed");
                Err(e)
            }
        }
    }

    /// Loop until a shutdown signal arrives. Errors are logged and the loop continues.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Starting expired-story reaper"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let _ = self.run_once().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("expired-story reaper stopping");
                    break;
                }
            }
        }
    }
}
