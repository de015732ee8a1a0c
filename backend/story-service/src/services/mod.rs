/// Business logic layer for story-service
///
/// - Clock: injectable time source for expiry decisions
/// - Stories: story lifecycle management
/// - Images: disk storage for uploaded story images
pub mod clock;
pub mod images;
pub mod stories;

pub use clock::{Clock, ManualClock, SystemClock};
pub use images::ImageStore;
pub use stories::StoriesService;
