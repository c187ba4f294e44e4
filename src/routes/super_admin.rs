use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::AssignAdminPayload;
use crate::dto::catalog_dto::{
    CreateDistrictPayload, CreateSchoolPayload, UpdateDistrictPayload, UpdateSchoolPayload,
};
use crate::error::Result;
use crate::AppState;

pub async fn admin_overview(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.admin_service.overview().await?))
}

pub async fn assign_admin(
    State(state): State<AppState>,
    Json(payload): Json<AssignAdminPayload>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .admin_service
        .assign(payload.user_id, payload.school_id)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn revoke_admin(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.admin_service.revoke(user_id).await?))
}

pub async fn list_schools(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.hierarchy_service.school_catalog().await?))
}

pub async fn create_school(
    State(state): State<AppState>,
    Json(payload): Json<CreateSchoolPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let school = state.hierarchy_service.create_school(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(school)))
}

pub async fn update_school(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSchoolPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(
        state
            .hierarchy_service
            .update_school(id, payload.into())
            .await?,
    ))
}

pub async fn delete_school(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.hierarchy_service.delete_school(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_district(
    State(state): State<AppState>,
    Json(payload): Json<CreateDistrictPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let district = state
        .hierarchy_service
        .create_district(payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(district)))
}

pub async fn update_district(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateDistrictPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    Ok(Json(
        state
            .hierarchy_service
            .update_district(id, payload.into())
            .await?,
    ))
}

pub async fn delete_district(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    state.hierarchy_service.delete_district(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
