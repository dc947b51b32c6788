pub mod disclaimer;
pub mod conversation;
pub mod telegram;

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::error;

use crate::error::DisclaimerError;

pub async fn main() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "service": "lavka-disclaimer-backend",
        "description": "Генерация юридических дисклеймеров для креативов Яндекс Лавки",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(main))
        .route("/health", web::get().to(health_check))

        .route("/api/cities", web::get().to(disclaimer::list_cities))
        .route("/api/schema/{creative_type}", web::get().to(disclaimer::get_schema))
        .route("/api/validate", web::post().to(disclaimer::validate))
        .route("/api/disclaimer", web::post().to(disclaimer::generate))
        .route("/api/disclaimer/batch", web::post().to(disclaimer::generate_batch))

        .route("/api/conversation/{user_id}", web::get().to(conversation::get_session))
        .route("/api/conversation/{user_id}", web::post().to(conversation::send_input))
        .route("/api/conversation/{user_id}", web::delete().to(conversation::clear_session))

        .route("/api/telegram/webhook", web::post().to(telegram::webhook));
}

/// Schema gate failures are the caller's fault; an unknown entity after a
/// passed gate is ours.
pub(crate) fn disclaimer_error(err: &DisclaimerError) -> HttpResponse {
    match err {
        DisclaimerError::Validation(msg) => HttpResponse::UnprocessableEntity().json(json!({
            "error": msg
        })),
        DisclaimerError::UnknownEntity(_) => {
            error!(error = %err, "registry consistency failure");
            HttpResponse::InternalServerError().json(json!({
                "error": err.to_string()
            }))
        }
    }
}
