use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::dto::application_dto::SubmitResponse;
use crate::error::{Error, Result};
use crate::services::application_service::Attachment;
use crate::utils::telegram_auth::TelegramIdentity;
use crate::AppState;

/// Multipart submission: a `feedback` text field and any number of `files` parts.
pub async fn submit_application(
    State(state): State<AppState>,
    Extension(identity): Extension<TelegramIdentity>,
    Path(vacancy_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let user = state.identity_service.require_registered(&identity).await?;

    let mut feedback = String::new();
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "feedback" => feedback = field.text().await?,
            "files" | "files[]" => {
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    return Err(Error::BadRequest("File part without a file name".into()));
                };
                let data = field.bytes().await?;
                files.push(Attachment { file_name, data });
            }
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let outcome = state
        .application_service
        .submit(&user, vacancy_id, feedback, files)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            application: outcome.application,
            warnings: outcome.warnings,
        }),
    ))
}
