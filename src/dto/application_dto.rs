use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{Application, ApplicationDetail, ApplicationStatus, Decision};
use crate::services::review_service::{DecisionOutcome, NotificationOutcome};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DecisionPayload {
    pub decision: Decision,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicantView {
    pub telegram_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// One application as rendered in the review list.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: Uuid,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    /// Decision controls stay enabled only while this is true.
    pub can_decide: bool,
    pub feedback: String,
    pub admin_comment: Option<String>,
    pub attachment_count: usize,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub vacancy_id: i64,
    pub vacancy_title: String,
    pub school_id: i64,
    pub school_name: String,
    pub applicant: ApplicantView,
}

impl From<ApplicationDetail> for ApplicationView {
    fn from(d: ApplicationDetail) -> Self {
        Self {
            id: d.id,
            status: d.status,
            status_label: d.status.label(),
            can_decide: d.status == ApplicationStatus::Pending,
            feedback: d.feedback,
            admin_comment: d.admin_comment,
            attachment_count: d.file_paths.len(),
            created_at: d.created_at,
            decided_at: d.decided_at,
            vacancy_id: d.vacancy_id,
            vacancy_title: d.vacancy_title,
            school_id: d.school_id,
            school_name: d.school_name,
            applicant: ApplicantView {
                telegram_id: d.applicant_telegram_id,
                first_name: d.applicant_first_name,
                last_name: d.applicant_last_name,
                phone_number: d.applicant_phone,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationView>,
    pub total: usize,
}

impl From<Vec<ApplicationDetail>> for ApplicationListResponse {
    fn from(items: Vec<ApplicationDetail>) -> Self {
        let items: Vec<ApplicationView> = items.into_iter().map(Into::into).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionResponse {
    pub application: ApplicationView,
    pub notification: NotificationOutcome,
    pub warnings: Vec<String>,
    pub applications: Option<ApplicationListResponse>,
}

impl From<DecisionOutcome> for DecisionResponse {
    fn from(o: DecisionOutcome) -> Self {
        Self {
            application: o.application.into(),
            notification: o.notification,
            warnings: o.warnings,
            applications: o.applications.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub application: Application,
    pub warnings: Vec<String>,
}

/// Applicant-side view of one of their own applications.
#[derive(Debug, Clone, Serialize)]
pub struct MyApplicationView {
    pub id: Uuid,
    pub vacancy_id: i64,
    pub vacancy_title: String,
    pub school_name: String,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub admin_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ApplicationDetail> for MyApplicationView {
    fn from(d: ApplicationDetail) -> Self {
        Self {
            id: d.id,
            vacancy_id: d.vacancy_id,
            vacancy_title: d.vacancy_title,
            school_name: d.school_name,
            status: d.status,
            status_label: d.status.label(),
            admin_comment: d.admin_comment,
            created_at: d.created_at,
        }
    }
}
