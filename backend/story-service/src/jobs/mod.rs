//! Background jobs for story-service
pub mod story_reaper;

pub use story_reaper::StoryReaper;
