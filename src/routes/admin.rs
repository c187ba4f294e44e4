use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::AdminScopeResponse;
use crate::dto::application_dto::{ApplicationListResponse, DecisionPayload, DecisionResponse};
use crate::dto::vacancy_dto::{CreateVacancyPayload, UpdateVacancyPayload, VacancyListQuery};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::services::admin_scope_service::AdminScope;
use crate::utils::telegram_auth::TelegramIdentity;
use crate::AppState;

async fn admin_schools(state: &AppState, identity: &TelegramIdentity) -> Result<(User, Vec<i64>)> {
    state
        .admin_scope_service
        .resolve(identity)
        .await?
        .require_schools()
}

pub async fn get_scope(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
) -> Result<impl IntoResponse> {
    let scope = state.admin_scope_service.resolve(&identity).await?;
    let error = match &scope {
        AdminScope::Unassigned { .. } => Some(Error::NoAssignedSchools.to_string()),
        AdminScope::NotAdmin | AdminScope::Schools { .. } => None,
    };
    Ok(Json(AdminScopeResponse {
        is_admin: scope.is_admin(),
        school_ids: scope.school_ids().to_vec(),
        error,
    }))
}

pub async fn list_applications(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
) -> Result<impl IntoResponse> {
    let (_, school_ids) = admin_schools(&state, &identity).await?;
    let items = state.review_service.list_applications(&school_ids).await?;
    Ok(Json(ApplicationListResponse::from(items)))
}

pub async fn decide(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecisionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (admin, school_ids) = admin_schools(&state, &identity).await?;
    let outcome = state
        .review_service
        .decide(&admin, &school_ids, id, payload.decision, payload.comment)
        .await?;
    Ok(Json(DecisionResponse::from(outcome)))
}

pub async fn list_attachments(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (_, school_ids) = admin_schools(&state, &identity).await?;
    Ok(Json(
        state.review_service.list_attachments(&school_ids, id).await?,
    ))
}

pub async fn list_vacancies(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Query(query): Query<VacancyListQuery>,
) -> Result<impl IntoResponse> {
    let (_, school_ids) = admin_schools(&state, &identity).await?;
    Ok(Json(
        state
            .vacancy_service
            .list(&school_ids, query.school_id)
            .await?,
    ))
}

pub async fn create_vacancy(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Json(payload): Json<CreateVacancyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (_, school_ids) = admin_schools(&state, &identity).await?;
    let vacancy = state
        .vacancy_service
        .create(&school_ids, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(vacancy)))
}

pub async fn update_vacancy(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateVacancyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (_, school_ids) = admin_schools(&state, &identity).await?;
    Ok(Json(
        state
            .vacancy_service
            .update(&school_ids, id, payload.into())
            .await?,
    ))
}

pub async fn delete_vacancy(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let (_, school_ids) = admin_schools(&state, &identity).await?;
    state.vacancy_service.delete(&school_ids, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
