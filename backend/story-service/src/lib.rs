/// Story Service Library
///
/// Ephemeral 24-hour stories: users post short text (optionally with an image),
/// everyone can browse what is still active, views are counted, and owners can
/// delete their own stories.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route registration
/// - `models`: Story and owner types plus their wire representation
/// - `services`: Story lifecycle, clock, and image storage
/// - `db`: Storage trait with PostgreSQL and in-memory implementations
/// - `jobs`: Background reaper for expired rows
/// - `middleware`: JWT authentication
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
