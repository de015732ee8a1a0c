/// Data models for story-service
///
/// - `Story`: an ephemeral post with a fixed 24-hour lifetime, with its owner resolved
/// - `StoryOwner`: the public profile fields of the author
/// - `StoryResponse`: the one wire shape every story endpoint returns
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime of every story, fixed at creation.
pub const STORY_TTL_HOURS: i64 = 24;

/// Maximum content length accepted at creation.
pub const MAX_CONTENT_CHARS: usize = 500;

pub fn story_ttl() -> Duration {
    Duration::hours(STORY_TTL_HOURS)
}

/// Public profile of a story's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoryOwner {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl StoryOwner {
    pub fn new(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            first_name: None,
            last_name: None,
            profile_picture: None,
        }
    }
}

/// A persisted story with its owner resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub id: Uuid,
    pub owner: StoryOwner,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub views: i64,
}

impl Story {
    pub fn owner_id(&self) -> Uuid {
        self.owner.id
    }

    /// Active iff `now < expires_at`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Values for a story insert; timestamps are computed by the lifecycle service.
#[derive(Debug, Clone)]
pub struct NewStory {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewStory {
    pub fn new(
        owner_id: Uuid,
        content: String,
        image_url: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        // Postgres keeps microseconds; match it so both stores agree.
        let created_at = created_at.trunc_subsecs(6);
        Self {
            id: Uuid::new_v4(),
            owner_id,
            content,
            image_url,
            created_at,
            expires_at: created_at + story_ttl(),
        }
    }
}

/// Wire representation of a story.
///
/// The owner is nested under `userId`, which is what existing clients read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    pub id: Uuid,
    pub user_id: StoryOwner,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub views: i64,
}

impl From<Story> for StoryResponse {
    fn from(story: Story) -> Self {
        Self {
            id: story.id,
            user_id: story.owner,
            content: story.content,
            image_url: story.image_url,
            created_at: story.created_at,
            expires_at: story.expires_at,
            views: story.views,
        }
    }
}

/// Body of `POST /stories`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedStoryResponse {
    pub message: String,
    pub story: StoryResponse,
}

/// Body of a successful delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
