use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::client::StoryApi;
use crate::errors::Result;
use crate::models::*;

/// The list of stories a user is browsing.
///
/// Clones share the same list, so a viewer holding a clone sees and updates
/// what the feed shows.
#[derive(Clone)]
pub struct StoryFeed {
    api: Arc<dyn StoryApi>,
    session: Session,
    stories: Arc<Mutex<Vec<Story>>>,
}

impl StoryFeed {
    pub fn new(api: Arc<dyn StoryApi>, session: Session) -> Self {
        Self {
            api,
            session,
            stories: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn api(&self) -> &Arc<dyn StoryApi> {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Story>> {
        // A panic elsewhere cannot leave the list half-written; keep using it.
        self.stories.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the current list.
    pub fn stories(&self) -> Vec<Story> {
        self.lock().clone()
    }

    pub fn get(&self, story_id: Uuid) -> Option<Story> {
        self.lock().iter().find(|s| s.id == story_id).cloned()
    }

    /// Load every active story.
    pub async fn refresh(&self) -> Result<usize> {
        let stories = self.api.list_stories().await?;
        let count = stories.len();
        *self.lock() = stories;
        tracing::debug!(count, "story feed refreshed");
        Ok(count)
    }

    /// Load one user's active stories.
    pub async fn refresh_for_user(&self, user_id: Uuid) -> Result<usize> {
        let stories = self.api.list_user_stories(user_id).await?;
        let count = stories.len();
        *self.lock() = stories;
        tracing::debug!(count, user_id = %user_id, "user story feed refreshed");
        Ok(count)
    }

    /// Publish a new story and put it at the top of the list.
    pub async fn create(&self, content: &str, image: Option<ImageUpload>) -> Result<Story> {
        let story = self.api.create_story(&self.session, content, image).await?;
        self.lock().insert(0, story.clone());
        Ok(story)
    }

    pub fn is_own_story(&self, story: &Story) -> bool {
        story.owner.id == self.session.user_id
    }

    /// Record a server-confirmed view count. Unknown stories are ignored.
    pub fn apply_view(&self, updated: &Story) {
        if let Some(story) = self.lock().iter_mut().find(|s| s.id == updated.id) {
            story.views = updated.views;
        }
    }

    pub fn remove(&self, story_id: Uuid) -> bool {
        let mut stories = self.lock();
        let before = stories.len();
        stories.retain(|s| s.id != story_id);
        stories.len() != before
    }
}

/// Relative age label: `"{m}m ago"` under an hour, `"{h}h ago"` under a day,
/// otherwise `"{d}d ago"`.
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - created_at).max(chrono::Duration::zero());
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();

    if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        format!("{}d ago", hours / 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{story_by, FakeStoryApi};
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_time_ago_labels() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now, now), "0m ago");
        assert_eq!(time_ago(now - Duration::seconds(59), now), "0m ago");
        assert_eq!(time_ago(now - Duration::minutes(59), now), "59m ago");
        assert_eq!(time_ago(now - Duration::minutes(60), now), "1h ago");
        assert_eq!(time_ago(now - Duration::hours(23), now), "23h ago");
        assert_eq!(time_ago(now - Duration::hours(24), now), "1d ago");
        assert_eq!(time_ago(now - Duration::hours(50), now), "2d ago");
        assert_eq!(time_ago(now + Duration::minutes(3), now), "0m ago");
    }

    #[tokio::test]
    async fn test_refresh_and_ownership() {
        let me = Uuid::new_v4();
        let mine = story_by(me, "mine");
        let theirs = story_by(Uuid::new_v4(), "theirs");
        let api = Arc::new(FakeStoryApi::with_stories(vec![mine.clone(), theirs.clone()]));
        let feed = StoryFeed::new(api, Session::new(me, "token"));

        assert_eq!(feed.refresh().await.unwrap(), 2);
        assert!(feed.is_own_story(&mine));
        assert!(!feed.is_own_story(&theirs));

        assert_eq!(feed.refresh_for_user(me).await.unwrap(), 1);
        assert_eq!(feed.stories(), vec![mine]);
    }

    #[tokio::test]
    async fn test_create_prepends() {
        let me = Uuid::new_v4();
        let existing = story_by(Uuid::new_v4(), "older");
        let api = Arc::new(FakeStoryApi::with_stories(vec![existing]));
        let feed = StoryFeed::new(api, Session::new(me, "token"));
        feed.refresh().await.unwrap();

        let created = feed.create("brand new", None).await.unwrap();
        let stories = feed.stories();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].id, created.id);
        assert_eq!(stories[0].owner.id, me);
    }

    #[tokio::test]
    async fn test_apply_view_and_remove() {
        let story = story_by(Uuid::new_v4(), "s");
        let api = Arc::new(FakeStoryApi::with_stories(vec![story.clone()]));
        let feed = StoryFeed::new(api, Session::new(Uuid::new_v4(), "token"));
        feed.refresh().await.unwrap();

        let mut updated = story.clone();
        updated.views = 9;
        feed.apply_view(&updated);
        assert_eq!(feed.get(story.id).unwrap().views, 9);

        assert!(feed.remove(story.id));
        assert!(!feed.remove(story.id));
        assert!(feed.stories().is_empty());
    }
}
