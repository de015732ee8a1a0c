/// Story Client Library
///
/// Client side of the story service: a typed API over HTTP, the feed of
/// active stories a user browses, and the viewer that shows one story at a
/// time with an auto-advancing progress timer.
///
/// It handles:
/// - Listing, creating, viewing and deleting stories
/// - Owner checks against an explicit `Session`
/// - "time ago" labels for story cards
/// - Progress timer and view counting while a story is open

pub mod client;
pub mod errors;
pub mod feed;
pub mod models;
pub mod viewer;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HttpStoryApi, StoryApi};
pub use errors::ClientError;
pub use feed::{time_ago, StoryFeed};
pub use models::{ImageUpload, Session, Story, StoryOwner};
pub use viewer::{StoryViewer, ViewerState};
