use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use validator::Validate;

use crate::dto::application_dto::MyApplicationView;
use crate::dto::user_dto::{MeResponse, RegisterPayload};
use crate::error::{Error, Result};
use crate::utils::telegram_auth::TelegramIdentity;
use crate::AppState;

pub async fn get_me(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
) -> Result<impl IntoResponse> {
    let user = state.identity_service.resolve_or_create(&identity).await?;
    let scope = state.admin_scope_service.resolve_user(user.clone()).await?;

    Ok(Json(MeResponse {
        registered: user.is_registered(),
        is_admin: scope.is_admin(),
        is_super_admin: state.config.is_super_admin(identity.id),
        user,
    }))
}

pub async fn register(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    if !payload.phone_is_plausible() {
        return Err(Error::BadRequest("Phone number is not valid".to_string()));
    }

    let user = state
        .identity_service
        .register(
            &identity,
            &payload.first_name,
            &payload.last_name,
            &payload.phone_number,
        )
        .await?;
    Ok((StatusCode::OK, Json(user)))
}

pub async fn my_applications(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
) -> Result<impl IntoResponse> {
    let items = match state.identity_service.resolve(&identity).await? {
        Some(user) => state.application_service.list_mine(&user).await?,
        None => Vec::new(),
    };
    let views: Vec<MyApplicationView> = items.into_iter().map(Into::into).collect();
    Ok(Json(views))
}
