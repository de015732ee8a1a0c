/// Database access layer
///
/// - `StoryStore`: the persistence interface the lifecycle service talks to
/// - `PgStoryStore`: PostgreSQL implementation (production)
/// - `MemoryStoryStore`: in-process implementation (local development, tests)
///
/// Time is always passed in by the caller so that expiry decisions made by the
/// store agree with the service's clock.
pub mod memory;
pub mod story_repo;

pub use memory::MemoryStoryStore;
pub use story_repo::PgStoryStore;

use crate::error::Result;
use crate::models::{NewStory, Story, StoryOwner};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Result of an atomic view increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    Viewed(Story),
    NotFound,
    Expired,
}

/// Result of an owner-gated delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    NotOwner,
}

#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Verify the backing storage is reachable.
    async fn health_check(&self) -> Result<()>;

    /// Insert or refresh the local copy of a user's public profile.
    async fn upsert_owner(&self, owner: &StoryOwner) -> Result<()>;

    async fn find_owner(&self, user_id: Uuid) -> Result<Option<StoryOwner>>;

    /// Persist a new story and return it with the owner resolved.
    async fn insert(&self, story: NewStory) -> Result<Story>;

    /// Fetch a story regardless of expiry.
    async fn find(&self, story_id: Uuid) -> Result<Option<Story>>;

    /// Stories with `expires_at > now`, newest first, optionally for one owner.
    async fn list_active(&self, owner_id: Option<Uuid>, now: DateTime<Utc>) -> Result<Vec<Story>>;

    /// Add exactly one view unless the story is missing or `now > expires_at`.
    ///
    /// Implementations must apply the increment atomically.
    async fn increment_views(&self, story_id: Uuid, now: DateTime<Utc>) -> Result<ViewOutcome>;

    /// Remove the story if `requester_id` owns it.
    async fn delete_owned(&self, story_id: Uuid, requester_id: Uuid) -> Result<DeleteOutcome>;

    /// Remove every story with `expires_at <= now`. Returns affected rows.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}
