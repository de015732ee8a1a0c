//! Shared harness for story-service integration tests
//!
//! Builds the full HTTP app against the in-memory store, a manual clock and a
//! temporary upload directory.

#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use chrono::{Duration, Utc};
use std::sync::Arc;
use story_service::db::MemoryStoryStore;
use story_service::handlers;
use story_service::middleware::JwtValidator;
use story_service::models::StoryOwner;
use story_service::services::{ImageStore, ManualClock, StoriesService};
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const BOUNDARY: &str = "----story-test-boundary";

pub struct TestContext {
    pub store: Arc<MemoryStoryStore>,
    pub clock: ManualClock,
    pub service: StoriesService,
    pub images: ImageStore,
    pub jwt: JwtValidator,
    pub upload_dir: tempfile::TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStoryStore::new());
        let clock = ManualClock::new(Utc::now());
        let service = StoriesService::with_clock(store.clone(), Arc::new(clock.clone()));
        let upload_dir = tempfile::tempdir().expect("create temp upload dir");
        let images = ImageStore::new(upload_dir.path(), MAX_IMAGE_BYTES);

        Self {
            store,
            clock,
            service,
            images,
            jwt: JwtValidator::new(JWT_SECRET),
            upload_dir,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.service.clone()))
            .app_data(web::Data::new(self.images.clone()))
            .app_data(web::Data::new(self.jwt.clone()))
            .configure(handlers::configure)
    }

    /// A user known to the store plus a bearer token for them.
    pub async fn user(&self, username: &str) -> (StoryOwner, String) {
        let owner = StoryOwner::new(Uuid::new_v4(), username);
        self.service
            .remember_owner(&owner)
            .await
            .expect("register owner");
        let token = self.token_for(&owner);
        (owner, token)
    }

    pub fn token_for(&self, owner: &StoryOwner) -> String {
        self.jwt
            .issue(owner.id, Some(&owner.username), Duration::hours(1))
            .expect("issue token")
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// One part of a hand-built `multipart/form-data` body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
