use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::models::{Input, TelegramUpdate};
use crate::state::AppState;

/// Session key for a Telegram user, kept apart from HTTP API identities.
pub fn session_key(telegram_user_id: i64) -> String {
    format!("tg:{}", telegram_user_id)
}

// Bot API webhook: one update, one dialog step, replies sent back through
// the Bot API. Always answers 200 once the bot is configured so Telegram does
// not redeliver the update.
pub async fn webhook(data: web::Json<TelegramUpdate>, state: web::Data<AppState>) -> HttpResponse {
    let Some(bot) = state.telegram.clone() else {
        return HttpResponse::ServiceUnavailable().json(json!({
            "error": "Telegram bot is not configured"
        }));
    };

    let update = data.into_inner();

    let (user_id, chat_id, input, callback_id) = if let Some(callback) = update.callback_query {
        let chat_id = callback
            .message
            .as_ref()
            .map(|m| m.chat.id)
            .unwrap_or(callback.from.id);
        let token = callback.data.unwrap_or_default();
        (callback.from.id, chat_id, Input::Callback(token), Some(callback.id))
    } else if let Some(message) = update.message {
        let Some(user_id) = message.from.as_ref().map(|u| u.id) else {
            debug!(update_id = update.update_id, "message without sender ignored");
            return HttpResponse::Ok().json(json!({"ok": true}));
        };
        let Some(text) = message.text else {
            debug!(update_id = update.update_id, "non-text message ignored");
            return HttpResponse::Ok().json(json!({"ok": true}));
        };
        (user_id, message.chat.id, Input::Text(text), None)
    } else {
        debug!(update_id = update.update_id, "update without message or callback ignored");
        return HttpResponse::Ok().json(json!({"ok": true}));
    };

    if let Some(id) = callback_id.as_deref() {
        if let Err(e) = bot.answer_callback_query(id, None).await {
            warn!(error = %e, "failed to answer callback query");
        }
    }

    if !state.config.is_allowed(user_id) {
        info!(user_id, "user is not in ADMIN_IDS, update ignored");
        return HttpResponse::Ok().json(json!({"ok": true}));
    }

    let reply = state.sessions.handle(&session_key(user_id), input).await;

    if let Err(e) = bot.send_reply(chat_id, &reply).await {
        error!(chat_id, error = %e, "failed to send reply to Telegram");
    }

    HttpResponse::Ok().json(json!({"ok": true}))
}
