//! Integration Tests: Story lifecycle
//!
//! Exercises `StoriesService` over the in-memory store with a manual clock:
//! fixed 24h lifetime, read-time expiry, exact view counting under
//! concurrency, and owner-only deletion.

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use story_service::db::{MemoryStoryStore, StoryStore};
use story_service::jobs::StoryReaper;
use story_service::models::StoryOwner;
use story_service::services::{Clock, ManualClock, StoriesService};
use story_service::AppError;
use tokio::sync::Barrier;
use uuid::Uuid;

struct Fixture {
    service: StoriesService,
    clock: ManualClock,
    owner: StoryOwner,
    store: Arc<MemoryStoryStore>,
}

fn fixture() -> Fixture {
    let owner = StoryOwner::new(Uuid::new_v4(), "owner");
    let store = Arc::new(MemoryStoryStore::with_owners([owner.clone()]));
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap());
    let service = StoriesService::with_clock(store.clone(), Arc::new(clock.clone()));
    Fixture {
        service,
        clock,
        owner,
        store,
    }
}

#[tokio::test]
async fn test_story_visible_for_exactly_one_day() {
    let f = fixture();
    let t0 = f.clock.now();

    let story = f.service.create_story(f.owner.id, "hello", None).await.unwrap();
    assert_eq!(story.created_at, t0);
    assert_eq!(story.expires_at, t0 + Duration::hours(24));

    f.clock.set(t0 + Duration::hours(23));
    let active = f.service.list_active_stories(None).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, story.id);

    f.clock.set(t0 + Duration::hours(24));
    assert!(f.service.list_active_stories(None).await.unwrap().is_empty());

    f.clock.set(t0 + Duration::hours(25));
    assert!(f.service.list_active_stories(None).await.unwrap().is_empty());
    assert!(f
        .service
        .list_active_stories(Some(f.owner.id))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_every_story_gets_same_lifetime() {
    let f = fixture();
    for i in 0..10 {
        f.clock.advance(Duration::minutes(37 * i));
        let story = f
            .service
            .create_story(f.owner.id, &format!("story {i}"), None)
            .await
            .unwrap();
        assert_eq!(story.expires_at - story.created_at, Duration::hours(24));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_views_are_all_counted() {
    let f = fixture();
    let story = f.service.create_story(f.owner.id, "popular", None).await.unwrap();

    const VIEWERS: usize = 64;
    let start = Arc::new(Barrier::new(VIEWERS));
    let mut handles = Vec::with_capacity(VIEWERS);
    for _ in 0..VIEWERS {
        let service = f.service.clone();
        let start = start.clone();
        handles.push(tokio::spawn(async move {
            start.wait().await;
            service.view_story(story.id, Uuid::new_v4()).await
        }));
    }

    let mut counts = Vec::with_capacity(VIEWERS);
    for handle in handles {
        counts.push(handle.await.unwrap().unwrap().views);
    }
    counts.sort_unstable();

    // Each increment observed a distinct value.
    assert_eq!(counts, (1..=VIEWERS as i64).collect::<Vec<_>>());
    let stored = f.service.get_story(story.id).await.unwrap();
    assert_eq!(stored.views, VIEWERS as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_two_concurrent_views_on_fresh_story() {
    let f = fixture();
    let story = f.service.create_story(f.owner.id, "fresh", None).await.unwrap();

    let story_id = story.id;
    let start = Arc::new(Barrier::new(2));
    let spawn_view = move |service: StoriesService, start: Arc<Barrier>| {
        tokio::spawn(async move {
            start.wait().await;
            service.view_story(story_id, Uuid::new_v4()).await
        })
    };
    let a = spawn_view(f.service.clone(), start.clone());
    let b = spawn_view(f.service.clone(), start);

    let mut counts = vec![
        a.await.unwrap().unwrap().views,
        b.await.unwrap().unwrap().views,
    ];
    counts.sort_unstable();
    assert_eq!(counts, vec![1, 2]);
}

#[tokio::test]
async fn test_same_viewer_counts_every_time() {
    let f = fixture();
    let story = f.service.create_story(f.owner.id, "again", None).await.unwrap();
    let viewer = Uuid::new_v4();

    for _ in 0..3 {
        f.service.view_story(story.id, viewer).await.unwrap();
    }
    assert_eq!(f.service.get_story(story.id).await.unwrap().views, 3);
}

#[tokio::test]
async fn test_expired_view_fails_without_counting() {
    let f = fixture();
    let story = f.service.create_story(f.owner.id, "fleeting", None).await.unwrap();
    f.service.view_story(story.id, Uuid::new_v4()).await.unwrap();

    f.clock.advance(Duration::hours(24) + Duration::seconds(1));
    let err = f
        .service
        .view_story(story.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Expired(_)));

    let stored = f.store_find(story.id).await;
    assert_eq!(stored.views, 1);
}

#[tokio::test]
async fn test_view_at_exact_expiry_still_counts() {
    let f = fixture();
    let story = f.service.create_story(f.owner.id, "edge", None).await.unwrap();

    f.clock.set(story.expires_at);
    let viewed = f.service.view_story(story.id, Uuid::new_v4()).await.unwrap();
    assert_eq!(viewed.views, 1);
    assert!(f.service.list_active_stories(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_by_non_owner_leaves_story() {
    let f = fixture();
    let story = f.service.create_story(f.owner.id, "keep out", None).await.unwrap();

    let err = f
        .service
        .delete_story(story.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(f.store.len(), 1);

    f.service.delete_story(story.id, f.owner.id).await.unwrap();
    assert!(f.store.is_empty());

    let err = f
        .service
        .delete_story(story.id, f.owner.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_owner_can_delete_expired_story() {
    let f = fixture();
    let story = f.service.create_story(f.owner.id, "stale", None).await.unwrap();
    f.clock.advance(Duration::hours(30));

    f.service.delete_story(story.id, f.owner.id).await.unwrap();
    assert!(f.store.is_empty());
}

#[tokio::test]
async fn test_reaper_never_changes_listing() {
    let f = fixture();
    f.service.create_story(f.owner.id, "a", None).await.unwrap();
    f.clock.advance(Duration::hours(12));
    f.service.create_story(f.owner.id, "b", None).await.unwrap();
    f.clock.advance(Duration::hours(13));

    let before = f.service.list_active_stories(None).await.unwrap();
    let reaper = StoryReaper::new(f.service.clone(), std::time::Duration::from_secs(60));
    assert_eq!(reaper.run_once().await.unwrap(), 1);
    let after = f.service.list_active_stories(None).await.unwrap();

    assert_eq!(before, after);
    assert_eq!(f.store.len(), 1);
}

impl Fixture {
    async fn store_find(&self, id: Uuid) -> story_service::models::Story {
        self.service
            .store()
            .find(id)
            .await
            .unwrap()
            .expect("story present")
    }
}
