use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::errors::{ClientError, Result};
use crate::models::*;

/// Story API operations the feed and viewer depend on.
#[async_trait]
pub trait StoryApi: Send + Sync {
    async fn list_stories(&self) -> Result<Vec<Story>>;

    async fn list_user_stories(&self, user_id: Uuid) -> Result<Vec<Story>>;

    async fn create_story(
        &self,
        session: &Session,
        content: &str,
        image: Option<ImageUpload>,
    ) -> Result<Story>;

    async fn view_story(&self, session: &Session, story_id: Uuid) -> Result<Story>;

    async fn delete_story(&self, session: &Session, story_id: Uuid) -> Result<()>;
}

/// Story API over HTTP
///
/// Talks to story-service's `/api/stories` routes.
#[derive(Clone)]
pub struct HttpStoryApi {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpStoryApi {
    /// Create new client
    ///
    /// # Arguments
    /// * `base_url` - Service origin, e.g. `http://localhost:5000`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http_client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL for an image reference returned by the API.
    pub fn image_url(&self, image_ref: &str) -> String {
        if image_ref.starts_with("http://") || image_ref.starts_with("https://") {
            image_ref.to_string()
        } else {
            self.url(image_ref)
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::check(response).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or(text);

        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl StoryApi for HttpStoryApi {
    async fn list_stories(&self) -> Result<Vec<Story>> {
        let response = self.http_client.get(self.url("/api/stories")).send().await?;
        Self::decode(response).await
    }

    async fn list_user_stories(&self, user_id: Uuid) -> Result<Vec<Story>> {
        let response = self
            .http_client
            .get(self.url(&format!("/api/stories/user/{}", user_id)))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn create_story(
        &self,
        session: &Session,
        content: &str,
        image: Option<ImageUpload>,
    ) -> Result<Story> {
        let mut form = Form::new().text("content", content.to_string());
        if let Some(image) = image {
            let part = Part::bytes(image.bytes)
                .file_name(image.filename)
                .mime_str(&image.content_type)?;
            form = form.part("image", part);
        }

        let response = self
            .http_client
            .post(self.url("/api/stories"))
            .bearer_auth(&session.token)
            .multipart(form)
            .send()
            .await?;

        let created: CreatedStory = Self::decode(response).await?;
        Ok(created.story)
    }

    async fn view_story(&self, session: &Session, story_id: Uuid) -> Result<Story> {
        let response = self
            .http_client
            .post(self.url(&format!("/api/stories/{}/view", story_id)))
            .bearer_auth(&session.token)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete_story(&self, session: &Session, story_id: Uuid) -> Result<()> {
        let response = self
            .http_client
            .delete(self.url(&format!("/api/stories/{}", story_id)))
            .bearer_auth(&session.token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
