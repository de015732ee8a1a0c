use crate::db::{DeleteOutcome, StoryStore, ViewOutcome};
use crate::error::{AppError, Result};
use crate::metrics::stories as metrics;
use crate::models::{NewStory, Story, StoryOwner, MAX_CONTENT_CHARS};
use crate::services::clock::{Clock, SystemClock};
use std::sync::Arc;
use uuid::Uuid;

/// Story lifecycle: creation with a fixed TTL, read-time expiry filtering,
/// atomic view counting and owner-only deletion.
#[derive(Clone)]
pub struct StoriesService {
    store: Arc<dyn StoryStore>,
    clock: Arc<dyn Clock>,
}

impl StoriesService {
    pub fn new(store: Arc<dyn StoryStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn StoryStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn StoryStore> {
        &self.store
    }

    /// Keep the local owner profile in step with what the identity provider asserts.
    pub async fn remember_owner(&self, owner: &StoryOwner) -> Result<()> {
        self.store.upsert_owner(owner).await
    }

    pub async fn create_story(
        &self,
        owner_id: Uuid,
        content: &str,
        image_url: Option<String>,
    ) -> Result<Story> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Story content is required".into()));
        }
        if content.chars().count() > MAX_CONTENT_CHARS {
            return Err(AppError::Validation(format!(
                "Story content must be at most {MAX_CONTENT_CHARS} characters"
            )));
        }

        if self.store.find_owner(owner_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".into()));
        }

        let new_story = NewStory::new(owner_id, content.to_string(), image_url, self.clock.now());
        let story = self.store.insert(new_story).await?;

        metrics::record_story_created();
        tracing::info!(
            story_id = %story.id,
            owner_id = %owner_id,
            expires_at = %story.expires_at,
            "story created"
        );
        Ok(story)
    }

    /// Snapshot of active stories as of this call, newest first.
    pub async fn list_active_stories(&self, owner_id: Option<Uuid>) -> Result<Vec<Story>> {
        self.store.list_active(owner_id, self.clock.now()).await
    }

    /// Read a single active story without counting a view.
    pub async fn get_story(&self, story_id: Uuid) -> Result<Story> {
        let story = self
            .store
            .find(story_id)
            .await?
            .ok_or_else(AppError::story_not_found)?;

        if !story.is_active_at(self.clock.now()) {
            return Err(AppError::story_expired());
        }
        Ok(story)
    }

    /// Count one view. Repeated views by the same user all count.
    pub async fn view_story(&self, story_id: Uuid, viewer_id: Uuid) -> Result<Story> {
        match self.store.increment_views(story_id, self.clock.now()).await? {
            ViewOutcome::Viewed(story) => {
                metrics::record_story_view("counted");
                tracing::debug!(story_id = %story_id, viewer_id = %viewer_id, views = story.views, "story viewed");
                Ok(story)
            }
            ViewOutcome::Expired => {
                metrics::record_story_view("expired");
                Err(AppError::story_expired())
            }
            ViewOutcome::NotFound => {
                metrics::record_story_view("not_found");
                Err(AppError::story_not_found())
            }
        }
    }

    pub async fn delete_story(&self, story_id: Uuid, requester_id: Uuid) -> Result<()> {
        match self.store.delete_owned(story_id, requester_id).await? {
            DeleteOutcome::Deleted => {
                metrics::record_story_deleted();
                tracing::info!(story_id = %story_id, owner_id = %requester_id, "story deleted");
                Ok(())
            }
            DeleteOutcome::NotOwner => {
                tracing::warn!(story_id = %story_id, requester_id = %requester_id, "delete refused for non-owner");
                Err(AppError::Forbidden("Not authorized to delete this story".into()))
            }
            DeleteOutcome::NotFound => Err(AppError::story_not_found()),
        }
    }

    /// Remove expired rows. Never changes what reads return.
    pub async fn purge_expired(&self) -> Result<u64> {
        self.store.purge_expired(self.clock.now()).await
    }
}
