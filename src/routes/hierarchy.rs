use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::error::Result;
use crate::AppState;

pub async fn list_regions(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.hierarchy_service.regions().await?))
}

pub async fn list_districts(
    State(state): State<AppState>,
    Path(region_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.hierarchy_service.districts(region_id).await?))
}

pub async fn list_schools(
    State(state): State<AppState>,
    Path(district_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.hierarchy_service.schools(district_id).await?))
}

pub async fn list_vacancies(
    State(state): State<AppState>,
    Path(school_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.hierarchy_service.vacancies(school_id).await?))
}

pub async fn get_vacancy(
    State(state): State<AppState>,
    Path(vacancy_id): Path<i64>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.hierarchy_service.vacancy(vacancy_id).await?))
}
