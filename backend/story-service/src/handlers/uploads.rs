use crate::error::{AppError, Result};
use crate::services::images::content_type_for;
use crate::services::ImageStore;
use actix_web::{http::header, web, HttpResponse};

/// Serve a stored story image
pub async fn serve_upload(
    images: web::Data<ImageStore>,
    name: web::Path<String>,
) -> Result<HttpResponse> {
    let path = images
        .resolve(&name)
        .ok_or_else(|| AppError::NotFound("File not found".into()))?;

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found".into()))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&name))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}
