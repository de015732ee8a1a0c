use super::{DeleteOutcome, StoryStore, ViewOutcome};
use crate::error::{AppError, Result};
use crate::models::{NewStory, Story, StoryOwner};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoryRecord {
    owner_id: Uuid,
    content: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    views: i64,
}

/// In-process story store.
///
/// Each story lives in one `DashMap` entry, so a view increment happens under that
/// entry's shard write lock and never races with another increment.
#[derive(Clone, Default)]
pub struct MemoryStoryStore {
    stories: Arc<DashMap<Uuid, StoryRecord>>,
    owners: Arc<DashMap<Uuid, StoryOwner>>,
}

impl MemoryStoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owners(owners: impl IntoIterator<Item = StoryOwner>) -> Self {
        let store = Self::new();
        for owner in owners {
            store.owners.insert(owner.id, owner);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    fn resolve(&self, id: Uuid, record: StoryRecord) -> Result<Story> {
        let owner = self
            .owners
            .get(&record.owner_id)
            .map(|o| o.value().clone())
            .ok_or_else(|| {
                AppError::Storage(format!("story {id} references unknown user {}", record.owner_id))
            })?;

        Ok(Story {
            id,
            owner,
            content: record.content,
            image_url: record.image_url,
            created_at: record.created_at,
            expires_at: record.expires_at,
            views: record.views,
        })
    }
}

#[async_trait]
impl StoryStore for MemoryStoryStore {
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert_owner(&self, owner: &StoryOwner) -> Result<()> {
        self.owners
            .entry(owner.id)
            .and_modify(|existing| {
                existing.username = owner.username.clone();
                if owner.first_name.is_some() {
                    existing.first_name = owner.first_name.clone();
                }
                if owner.last_name.is_some() {
                    existing.last_name = owner.last_name.clone();
                }
                if owner.profile_picture.is_some() {
                    existing.profile_picture = owner.profile_picture.clone();
                }
            })
            .or_insert_with(|| owner.clone());
        Ok(())
    }

    async fn find_owner(&self, user_id: Uuid) -> Result<Option<StoryOwner>> {
        Ok(self.owners.get(&user_id).map(|o| o.value().clone()))
    }

    async fn insert(&self, story: NewStory) -> Result<Story> {
        if !self.owners.contains_key(&story.owner_id) {
            return Err(AppError::Storage(format!(
                "foreign key violation: unknown user {}",
                story.owner_id
            )));
        }

        let record = StoryRecord {
            owner_id: story.owner_id,
            content: story.content,
            image_url: story.image_url,
            created_at: story.created_at,
            expires_at: story.expires_at,
            views: 0,
        };
        self.stories.insert(story.id, record.clone());
        self.resolve(story.id, record)
    }

    async fn find(&self, story_id: Uuid) -> Result<Option<Story>> {
        let record = self.stories.get(&story_id).map(|r| r.value().clone());
        record.map(|r| self.resolve(story_id, r)).transpose()
    }

    async fn list_active(&self, owner_id: Option<Uuid>, now: DateTime<Utc>) -> Result<Vec<Story>> {
        let snapshot: Vec<(Uuid, StoryRecord)> = self
            .stories
            .iter()
            .filter(|entry| entry.expires_at > now)
            .filter(|entry| owner_id.map_or(true, |id| entry.owner_id == id))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut stories = snapshot
            .into_iter()
            .map(|(id, record)| self.resolve(id, record))
            .collect::<Result<Vec<_>>>()?;
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(stories)
    }

    async fn increment_views(&self, story_id: Uuid, now: DateTime<Utc>) -> Result<ViewOutcome> {
        let updated = match self.stories.get_mut(&story_id) {
            None => return Ok(ViewOutcome::NotFound),
            Some(mut entry) => {
                if now > entry.expires_at {
                    return Ok(ViewOutcome::Expired);
                }
                entry.views += 1;
                entry.value().clone()
            }
        };

        Ok(ViewOutcome::Viewed(self.resolve(story_id, updated)?))
    }

    async fn delete_owned(&self, story_id: Uuid, requester_id: Uuid) -> Result<DeleteOutcome> {
        if self
            .stories
            .remove_if(&story_id, |_, record| record.owner_id == requester_id)
            .is_some()
        {
            return Ok(DeleteOutcome::Deleted);
        }

        Ok(if self.stories.contains_key(&story_id) {
            DeleteOutcome::NotOwner
        } else {
            DeleteOutcome::NotFound
        })
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let before = self.stories.len();
        self.stories.retain(|_, record| record.expires_at > now);
        Ok(before.saturating_sub(self.stories.len()) as u64)
    }
}
