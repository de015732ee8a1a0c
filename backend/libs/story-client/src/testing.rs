//! In-process `StoryApi` for unit tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::client::StoryApi;
use crate::errors::{ClientError, Result};
use crate::models::*;

pub fn story_by(owner_id: Uuid, content: &str) -> Story {
    let created_at = Utc::now();
    Story {
        id: Uuid::new_v4(),
        owner: StoryOwner {
            id: owner_id,
            username: format!("user-{}", &owner_id.to_string()[..8]),
            first_name: None,
            last_name: None,
            profile_picture: None,
        },
        content: content.to_string(),
        image_url: None,
        created_at,
        expires_at: created_at + Duration::hours(24),
        views: 0,
    }
}

#[derive(Default)]
pub struct FakeStoryApi {
    stories: Mutex<Vec<Story>>,
    pub fail_views: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub view_calls: AtomicUsize,
    /// Simulated latency of view calls.
    pub view_delay: Mutex<Option<std::time::Duration>>,
}

impl FakeStoryApi {
    pub fn with_stories(stories: Vec<Story>) -> Self {
        Self {
            stories: Mutex::new(stories),
            ..Default::default()
        }
    }

    pub fn set_view_delay(&self, delay: std::time::Duration) {
        *self.view_delay.lock().unwrap() = Some(delay);
    }

    pub fn contains(&self, story_id: Uuid) -> bool {
        self.stories.lock().unwrap().iter().any(|s| s.id == story_id)
    }
}

fn status(status: u16, message: &str) -> ClientError {
    ClientError::Status {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl StoryApi for FakeStoryApi {
    async fn list_stories(&self) -> Result<Vec<Story>> {
        Ok(self.stories.lock().unwrap().clone())
    }

    async fn list_user_stories(&self, user_id: Uuid) -> Result<Vec<Story>> {
        Ok(self
            .stories
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.owner.id == user_id)
            .cloned()
            .collect())
    }

    async fn create_story(
        &self,
        session: &Session,
        content: &str,
        _image: Option<ImageUpload>,
    ) -> Result<Story> {
        if content.trim().is_empty() {
            return Err(status(400, "Story content is required"));
        }
        let story = story_by(session.user_id, content.trim());
        self.stories.lock().unwrap().insert(0, story.clone());
        Ok(story)
    }

    async fn view_story(&self, _session: &Session, story_id: Uuid) -> Result<Story> {
        self.view_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.view_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_views.load(Ordering::SeqCst) {
            return Err(status(500, "Server error"));
        }

        let mut stories = self.stories.lock().unwrap();
        let story = stories
            .iter_mut()
            .find(|s| s.id == story_id)
            .ok_or_else(|| status(404, "Story not found"))?;
        story.views += 1;
        Ok(story.clone())
    }

    async fn delete_story(&self, session: &Session, story_id: Uuid) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(status(500, "Server error"));
        }

        let mut stories = self.stories.lock().unwrap();
        let idx = stories
            .iter()
            .position(|s| s.id == story_id)
            .ok_or_else(|| status(404, "Story not found"))?;
        if stories[idx].owner.id != session.user_id {
            return Err(status(403, "Not authorized to delete this story"));
        }
        stories.remove(idx);
        Ok(())
    }
}
