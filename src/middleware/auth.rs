use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::utils::telegram_auth::{verify_init_data, InitDataError, TelegramIdentity};
use crate::utils::time::unix_now;
use crate::AppState;

pub const INIT_DATA_HEADER: &str = "x-telegram-init-data";

fn unauthorized(code: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": message, "code": code})),
    )
        .into_response()
}

/// Raw init-data from `X-Telegram-Init-Data` or `Authorization: tma <data>`.
fn extract_init_data(req: &Request) -> Option<&str> {
    if let Some(value) = req.headers().get(INIT_DATA_HEADER) {
        return value.to_str().ok().filter(|v| !v.is_empty());
    }
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("tma "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Verifies the mini-app launch payload and stores the caller's
/// [`TelegramIdentity`] in the request extensions.
pub async fn require_telegram_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(raw) = extract_init_data(&req) else {
        return unauthorized("missing_init_data", "Telegram init data is required");
    };

    let verified = verify_init_data(
        raw,
        &state.config.telegram_bot_token,
        state.config.init_data_max_age_secs,
        unix_now(),
    );

    match verified {
        Ok(data) => {
            tracing::debug!(telegram_id = data.user.id, "init data verified");
            req.extensions_mut().insert(data.user);
            next.run(req).await
        }
        Err(InitDataError::Expired) => {
            unauthorized("init_data_expired", "Telegram session has expired, reopen the app")
        }
        Err(e) => {
            tracing::warn!(error = %e, "rejected init data");
            unauthorized("invalid_init_data", "Telegram init data is invalid")
        }
    }
}

/// Must run after [`require_telegram_user`].
pub async fn require_super_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(identity) = req.extensions().get::<TelegramIdentity>() else {
        return unauthorized("missing_init_data", "Telegram init data is required");
    };
    if !state.config.is_super_admin(identity.id) {
        tracing::warn!(telegram_id = identity.id, "super-admin route refused");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Super-admin access required", "code": "forbidden"})),
        )
            .into_response();
    }
    next.run(req).await
}
