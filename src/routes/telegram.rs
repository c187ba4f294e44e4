use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use subtle::ConstantTimeEq;

use crate::dto::webhook_dto::TelegramUpdate;
use crate::AppState;

pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

const WELCOME_TEXT: &str = "Assalomu alaykum! Maktablardagi bo'sh ish o'rinlarini ko'rish va ariza topshirish uchun ilovani oching.";
const OPEN_APP_BUTTON: &str = "Ilovani ochish";
const HELP_TEXT: &str = "Ishni boshlash uchun /start buyrug'idan foydalaning.";

fn secret_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|got| bool::from(got.as_bytes().ct_eq(expected.as_bytes())))
        .unwrap_or(false)
}

/// Bot webhook. Every authenticated delivery gets a 200, including updates
/// that cannot be parsed, so Telegram does not redeliver them.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if let Some(secret) = state.config.telegram_webhook_secret.as_deref() {
        if !secret_matches(&headers, secret) {
            tracing::warn!("telegram webhook called with a bad secret token");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let update: TelegramUpdate = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, bytes = body.len(), "ignoring unparseable telegram update");
            return StatusCode::OK;
        }
    };

    tracing::info!(update_id = update.update_id, "telegram update received");
    let Some(message) = update.message else {
        return StatusCode::OK;
    };
    let Some(text) = message.text.as_deref() else {
        return StatusCode::OK;
    };
    if message.from.as_ref().map(|f| f.is_bot).unwrap_or(false) {
        return StatusCode::OK;
    }

    let chat_id = message.chat.id;
    let sent = if text.starts_with("/start") {
        match state.config.webapp_url.as_deref() {
            Some(url) => {
                state
                    .notification_service
                    .send_web_app_invite(chat_id, WELCOME_TEXT, OPEN_APP_BUTTON, url)
                    .await
            }
            None => state.notification_service.send_text(chat_id, WELCOME_TEXT).await,
        }
    } else {
        state.notification_service.send_text(chat_id, HELP_TEXT).await
    };

    if let Err(e) = sent {
        tracing::warn!(chat_id, error = %e, "failed to answer telegram update");
    }
    StatusCode::OK
}
