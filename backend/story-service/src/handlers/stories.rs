/// Story handlers - HTTP endpoints for story operations
use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::models::{CreatedStoryResponse, MessageResponse, StoryResponse};
use crate::services::images::{extension_for, too_large};
use crate::services::{ImageStore, StoriesService};
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::stream::StreamExt;
use uuid::Uuid;

/// Text fields are small; anything larger is a broken or hostile client.
const MAX_TEXT_FIELD_BYTES: usize = 16 * 1024;

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {what} id")))
}

fn to_responses(stories: Vec<crate::models::Story>) -> Vec<StoryResponse> {
    stories.into_iter().map(StoryResponse::from).collect()
}

/// List all active stories
pub async fn list_stories(service: web::Data<StoriesService>) -> Result<HttpResponse> {
    let stories = service.list_active_stories(None).await?;
    Ok(HttpResponse::Ok().json(to_responses(stories)))
}

/// List one user's active stories
pub async fn list_user_stories(
    service: web::Data<StoriesService>,
    user_id: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = parse_id(&user_id, "user")?;
    let stories = service.list_active_stories(Some(user_id)).await?;
    Ok(HttpResponse::Ok().json(to_responses(stories)))
}

/// Get a story without counting a view
pub async fn get_story(
    service: web::Data<StoriesService>,
    story_id: web::Path<String>,
) -> Result<HttpResponse> {
    let story_id = parse_id(&story_id, "story")?;
    let story = service.get_story(story_id).await?;
    Ok(HttpResponse::Ok().json(StoryResponse::from(story)))
}

/// Parsed `multipart/form-data` body of a create request.
#[derive(Debug, Default)]
struct StoryForm {
    content: Option<String>,
    image: Option<ImageUpload>,
}

#[derive(Debug)]
struct ImageUpload {
    extension: String,
    bytes: Vec<u8>,
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::warn!(error = %e, "error reading multipart field");
            AppError::BadRequest("Malformed multipart body".into())
        })?;
        if buf.len() + chunk.len() > limit {
            return Err(too_large(limit));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

async fn parse_story_form(mut payload: Multipart, max_image_bytes: usize) -> Result<StoryForm> {
    let mut form = StoryForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            tracing::warn!(error = %e, "invalid multipart payload");
            AppError::BadRequest("Malformed multipart body".into())
        })?;

        match field.name().unwrap_or_default() {
            "content" => {
                let raw = read_field(&mut field, MAX_TEXT_FIELD_BYTES).await?;
                let text = String::from_utf8(raw)
                    .map_err(|_| AppError::BadRequest("content must be UTF-8".into()))?;
                form.content = Some(text);
            }
            "image" => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_string);
                let content_type = field.content_type().cloned();

                let bytes = read_field(&mut field, max_image_bytes).await?;
                // Browsers send an empty part when no file was picked.
                if bytes.is_empty() && filename.as_deref().unwrap_or_default().is_empty() {
                    continue;
                }

                let content_type = match content_type {
                    Some(ct) if ct.type_() == mime::IMAGE => ct,
                    _ => {
                        return Err(AppError::Validation(
                            "Only image files are allowed!".into(),
                        ))
                    }
                };

                form.image = Some(ImageUpload {
                    extension: extension_for(filename.as_deref(), &content_type),
                    bytes,
                });
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown multipart field");
                while let Some(chunk) = field.next().await {
                    if chunk.is_err() {
                        break;
                    }
                }
            }
        }
    }

    Ok(form)
}

/// Create a story (multipart: `content`, optional `image`)
pub async fn create_story(
    service: web::Data<StoriesService>,
    images: web::Data<ImageStore>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = parse_story_form(payload, images.max_bytes()).await?;

    let content = form.content.unwrap_or_default();
    if content.trim().is_empty() {
        return Err(AppError::Validation("Story content is required".into()));
    }

    if let Some(owner) = user.as_owner() {
        service.remember_owner(&owner).await?;
    }

    let image_url = match form.image {
        Some(image) => Some(images.save(&image.extension, &image.bytes).await?),
        None => None,
    };

    let story = match service
        .create_story(user.user_id, &content, image_url.clone())
        .await
    {
        Ok(story) => story,
        Err(e) => {
            if let Some(url) = image_url.as_deref() {
                images.remove(url).await;
            }
            return Err(e);
        }
    };

    Ok(HttpResponse::Created().json(CreatedStoryResponse {
        message: "Story created successfully".to_string(),
        story: story.into(),
    }))
}

/// Count one view of a story
pub async fn view_story(
    service: web::Data<StoriesService>,
    user: AuthenticatedUser,
    story_id: web::Path<String>,
) -> Result<HttpResponse> {
    let story_id = parse_id(&story_id, "story")?;
    let story = service.view_story(story_id, user.user_id).await?;
    Ok(HttpResponse::Ok().json(StoryResponse::from(story)))
}

/// Delete a story (owner only)
pub async fn delete_story(
    service: web::Data<StoriesService>,
    user: AuthenticatedUser,
    story_id: web::Path<String>,
) -> Result<HttpResponse> {
    let story_id = parse_id(&story_id, "story")?;
    service.delete_story(story_id, user.user_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Story deleted successfully".to_string(),
    }))
}
