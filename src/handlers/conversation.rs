use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::models::ConversationRequest;
use crate::state::AppState;

pub async fn send_input(
    path: web::Path<String>,
    data: web::Json<ConversationRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let user_id = path.into_inner();

    let Some(input) = data.into_inner().into_input() else {
        return HttpResponse::BadRequest().json(json!({
            "error": "Either text or callback is required"
        }));
    };

    let reply = state.sessions.handle(&user_id, input).await;
    HttpResponse::Ok().json(reply)
}

pub async fn get_session(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let user_id = path.into_inner();

    match state.sessions.snapshot(&user_id).await {
        Some(session) => HttpResponse::Ok().json(session),
        None => HttpResponse::NotFound().json(json!({
            "error": "Conversation not found"
        })),
    }
}

pub async fn clear_session(path: web::Path<String>, state: web::Data<AppState>) -> HttpResponse {
    let user_id = path.into_inner();
    let cleared = state.sessions.clear(&user_id);

    HttpResponse::Ok().json(json!({
        "success": true,
        "cleared": cleared
    }))
}
