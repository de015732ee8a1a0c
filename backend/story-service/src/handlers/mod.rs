/// HTTP handlers for story-service
///
/// - Stories: list, read, create, view and delete ephemeral stories
/// - Uploads: serve stored story images
/// - Health: liveness and readiness probes
///
/// Handlers expect `StoriesService`, `ImageStore` and `JwtValidator` as app data.
pub mod health;
pub mod stories;
pub mod uploads;

pub use health::{health_summary, liveness_check, readiness_summary};
pub use stories::{
    create_story, delete_story, get_story, list_stories, list_user_stories, view_story,
};
pub use uploads::serve_upload;

use actix_web::web;

/// Register every route the service exposes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(crate::metrics::serve_metrics))
        .route("/api/v1/health", web::get().to(health_summary))
        .route("/api/v1/health/ready", web::get().to(readiness_summary))
        .route("/api/v1/health/live", web::get().to(liveness_check))
        .route("/uploads/{file}", web::get().to(serve_upload))
        .service(
            web::scope("/api/stories")
                .service(
                    web::resource("")
                        .route(web::get().to(list_stories))
                        .route(web::post().to(create_story)),
                )
                .service(web::resource("/user/{user_id}").route(web::get().to(list_user_stories)))
                .service(
                    web::resource("/{story_id}")
                        .route(web::get().to(get_story))
                        .route(web::delete().to(delete_story)),
                )
                .route("/{story_id}/view", web::post().to(view_story)),
        );
}
