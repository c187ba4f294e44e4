use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationDetail, Decision};
use crate::models::user::User;
use crate::services::notification_service::{
    AdminContact, NotificationService, StatusFields, TemplateKind,
};
use crate::services::storage_service::BlobStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationOutcome {
    Sent,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    pub application: ApplicationDetail,
    pub notification: NotificationOutcome,
    pub warnings: Vec<String>,
    /// The admin's list as stored after the decision; `None` if reloading failed.
    pub applications: Option<Vec<ApplicationDetail>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentLink {
    pub name: String,
    pub path: String,
    pub url: String,
}

/// Admin-scoped listing and decisions on applications.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
    notifications: NotificationService,
}

fn merge_decision(mut detail: ApplicationDetail, updated: &Application) -> ApplicationDetail {
    detail.status = updated.status;
    detail.admin_comment = updated.admin_comment.clone();
    detail.decided_at = updated.decided_at;
    detail
}

impl ReviewService {
    pub fn new(
        store: Arc<dyn Store>,
        blobs: Arc<dyn BlobStore>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            store,
            blobs,
            notifications,
        }
    }

    /// Applications for the given schools, newest first.
    ///
    /// An empty scope is reported as [`Error::NoAssignedSchools`], never as an
    /// empty list.
    pub async fn list_applications(&self, school_ids: &[i64]) -> Result<Vec<ApplicationDetail>> {
        if school_ids.is_empty() {
            return Err(Error::NoAssignedSchools);
        }
        self.store
            .list_applications_for_schools(school_ids)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to load applications");
                Error::Unavailable("Failed to load applications".to_string())
            })
    }

    async fn scoped_detail(&self, school_ids: &[i64], id: Uuid) -> Result<ApplicationDetail> {
        let detail = self
            .store
            .get_application_detail(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;
        if !school_ids.contains(&detail.school_id) {
            tracing::warn!(application_id = %id, school_id = detail.school_id, "application outside admin scope");
            return Err(Error::Forbidden(
                "This application belongs to a school you do not administer".to_string(),
            ));
        }
        Ok(detail)
    }

    /// Accepts or rejects a pending application and tells the applicant.
    ///
    /// The status write stands on its own: a failed notification only adds a
    /// warning to the outcome.
    pub async fn decide(
        &self,
        admin: &User,
        school_ids: &[i64],
        application_id: Uuid,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<DecisionOutcome> {
        if school_ids.is_empty() {
            return Err(Error::NoAssignedSchools);
        }
        let current = self.scoped_detail(school_ids, application_id).await?;

        let target = decision.target_status();
        if !current.status.can_transition_to(target) {
            return Err(Error::InvalidTransition(format!(
                "Application is already {}",
                current.status
            )));
        }

        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let updated = self
            .store
            .transition_application(application_id, current.status, target, comment.clone())
            .await?;
        let Some(updated) = updated else {
            // Someone else decided between our read and our write.
            let status = self
                .store
                .get_application_detail(application_id)
                .await?
                .map(|d| d.status.to_string())
                .unwrap_or_else(|| "gone".to_string());
            tracing::warn!(application_id = %application_id, %status, "concurrent decision detected");
            return Err(Error::InvalidTransition(format!(
                "Application is already {}",
                status
            )));
        };
        tracing::info!(
            application_id = %application_id,
            admin_id = %admin.id,
            status = %updated.status,
            "application decided"
        );

        let mut warnings = Vec::new();
        let application = match self.store.get_application_detail(application_id).await {
            Ok(Some(detail)) => detail,
            Ok(None) => {
                tracing::warn!(application_id = %application_id, "decided application vanished on re-read");
                merge_decision(current, &updated)
            }
            Err(e) => {
                tracing::warn!(application_id = %application_id, error = %e, "re-reading decided application failed");
                merge_decision(current, &updated)
            }
        };

        let fields = StatusFields {
            vacancy_title: application.vacancy_title.clone(),
            comment: application.admin_comment.clone(),
            admin: Some(AdminContact {
                first_name: admin.first_name.clone(),
                last_name: admin.last_name.clone(),
                phone_number: admin.phone_number.clone(),
            }),
        };
        let notification = match self
            .notifications
            .notify(
                application.applicant_telegram_id,
                TemplateKind::from(application.status),
                &fields,
            )
            .await
        {
            Ok(()) => NotificationOutcome::Sent,
            Err(e) => {
                tracing::warn!(
                    application_id = %application_id,
                    recipient = application.applicant_telegram_id,
                    error = %e,
                    "applicant notification failed"
                );
                warnings.push(
                    "Status updated, but the applicant could not be notified".to_string(),
                );
                NotificationOutcome::Failed
            }
        };

        let applications = match self.list_applications(school_ids).await {
            Ok(list) => Some(list),
            Err(_) => {
                warnings.push("Failed to refresh applications, please reload".to_string());
                None
            }
        };

        Ok(DecisionOutcome {
            application,
            notification,
            warnings,
            applications,
        })
    }

    pub async fn list_attachments(
        &self,
        school_ids: &[i64],
        application_id: Uuid,
    ) -> Result<Vec<AttachmentLink>> {
        if school_ids.is_empty() {
            return Err(Error::NoAssignedSchools);
        }
        let detail = self.scoped_detail(school_ids, application_id).await?;
        Ok(detail
            .file_paths
            .iter()
            .map(|path| AttachmentLink {
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                path: path.clone(),
                url: self.blobs.public_url(path),
            })
            .collect())
    }
}
