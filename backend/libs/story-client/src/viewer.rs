//! Full-screen story viewer
//!
//! `Closed -> Open(story, progress) -> Closed`. Opening a story starts a progress
//! timer that closes the viewer once it reaches 100 and fires a view-count call
//! that never holds up the timer.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::errors::{ClientError, Result};
use crate::feed::StoryFeed;
use crate::models::Story;

/// Progress timer tick.
pub const TICK: Duration = Duration::from_millis(50);
/// Time a story stays on screen.
pub const DISPLAY_DURATION: Duration = Duration::from_millis(5000);

const PROGRESS_STEP: f64 = 100.0 * (TICK.as_millis() as f64) / (DISPLAY_DURATION.as_millis() as f64);

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerState {
    Closed,
    Open { story: Story, progress: f64 },
}

struct Inner {
    state: ViewerState,
    /// Bumped on every open/close; stale timers and responses compare against it.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl Inner {
    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn close(&mut self) {
        self.stop_timer();
        self.generation += 1;
        self.state = ViewerState::Closed;
    }
}

/// Drives one open story at a time over a shared [`StoryFeed`].
///
/// Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct StoryViewer {
    feed: StoryFeed,
    inner: Arc<Mutex<Inner>>,
}

impl StoryViewer {
    pub fn new(feed: StoryFeed) -> Self {
        Self {
            feed,
            inner: Arc::new(Mutex::new(Inner {
                state: ViewerState::Closed,
                generation: 0,
                timer: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ViewerState {
        self.lock().state.clone()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.lock().state, ViewerState::Open { .. })
    }

    pub fn current(&self) -> Option<Story> {
        match &self.lock().state {
            ViewerState::Open { story, .. } => Some(story.clone()),
            ViewerState::Closed => None,
        }
    }

    pub fn progress(&self) -> Option<f64> {
        match &self.lock().state {
            ViewerState::Open { progress, .. } => Some(*progress),
            ViewerState::Closed => None,
        }
    }

    /// Show `story`, replacing whatever was open.
    pub fn open(&self, story: Story) {
        let story_id = story.id;
        let generation = {
            let mut inner = self.lock();
            inner.stop_timer();
            inner.generation += 1;
            inner.state = ViewerState::Open { story, progress: 0.0 };
            inner.timer = Some(self.spawn_timer(inner.generation));
            inner.generation
        };

        self.spawn_view(story_id, generation);
    }

    pub fn close(&self) {
        self.lock().close();
    }

    /// Delete the open story. Only its owner may do this.
    ///
    /// On failure the viewer stays open on the same story.
    pub async fn delete_current(&self) -> Result<()> {
        let story = self.current().ok_or(ClientError::NothingOpen)?;
        if !self.feed.is_own_story(&story) {
            return Err(ClientError::NotOwner);
        }

        self.feed
            .api()
            .delete_story(self.feed.session(), story.id)
            .await?;

        self.feed.remove(story.id);
        let mut inner = self.lock();
        if matches!(&inner.state, ViewerState::Open { story: open, .. } if open.id == story.id) {
            inner.close();
        }
        tracing::info!(story_id = %story.id, "story deleted");
        Ok(())
    }

    fn spawn_timer(&self, generation: u64) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(inner) = inner.upgrade() else { return };
                let mut inner = inner.lock().unwrap_or_else(|p| p.into_inner());
                if inner.generation != generation {
                    return;
                }
                let ViewerState::Open { progress, .. } = &mut inner.state else {
                    return;
                };
                *progress += PROGRESS_STEP;
                if *progress >= 100.0 {
                    inner.timer = None;
                    inner.generation += 1;
                    inner.state = ViewerState::Closed;
                    return;
                }
            }
        })
    }

    fn spawn_view(&self, story_id: Uuid, generation: u64) {
        let feed = self.feed.clone();
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            match feed.api().view_story(feed.session(), story_id).await {
                Ok(updated) => {
                    feed.apply_view(&updated);
                    let Some(inner) = inner.upgrade() else { return };
                    let mut inner = inner.lock().unwrap_or_else(|p| p.into_inner());
                    if inner.generation != generation {
                        return;
                    }
                    if let ViewerState::Open { story, .. } = &mut inner.state {
                        if story.id == updated.id {
                            story.views = updated.views;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(story_id = %story_id, error = %e, "failed to record story view");
                }
            }
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.stop_timer();
    }
}
