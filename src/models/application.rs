use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of an application.
///
/// Only `Pending -> Accepted` and `Pending -> Rejected` are reachable through
/// the review workflow. `Interview` and `RejectedImmediately` exist so the
/// notification templates can address them, but no transition produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Interview,
    Accepted,
    Rejected,
    RejectedImmediately,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::RejectedImmediately => "rejected_immediately",
        }
    }

    /// Human label shown on the status badge.
    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Ko'rib chiqilmoqda",
            ApplicationStatus::Interview => "Suhbatga taklif qilingan",
            ApplicationStatus::Accepted => "Qabul qilingan",
            ApplicationStatus::Rejected => "Rad etilgan",
            ApplicationStatus::RejectedImmediately => "Dastlabki bosqichda rad etilgan",
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            ApplicationStatus::Pending | ApplicationStatus::Interview => false,
            ApplicationStatus::Accepted
            | ApplicationStatus::Rejected
            | ApplicationStatus::RejectedImmediately => true,
        }
    }

    /// Whether the review workflow may move an application from `self` to `next`.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        match (self, next) {
            (ApplicationStatus::Pending, ApplicationStatus::Accepted)
            | (ApplicationStatus::Pending, ApplicationStatus::Rejected) => true,
            (ApplicationStatus::Pending, _)
            | (ApplicationStatus::Interview, _)
            | (ApplicationStatus::Accepted, _)
            | (ApplicationStatus::Rejected, _)
            | (ApplicationStatus::RejectedImmediately, _) => false,
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two outcomes an admin can choose for a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    pub fn target_status(&self) -> ApplicationStatus {
        match self {
            Decision::Accepted => ApplicationStatus::Accepted,
            Decision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub vacancy_id: i64,
    pub user_id: Uuid,
    pub feedback: String,
    pub file_paths: Vec<String>,
    pub status: ApplicationStatus,
    pub admin_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Application joined with its applicant, vacancy and school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ApplicationDetail {
    pub id: Uuid,
    pub vacancy_id: i64,
    pub user_id: Uuid,
    pub feedback: String,
    pub file_paths: Vec<String>,
    pub status: ApplicationStatus,
    pub admin_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub applicant_telegram_id: i64,
    pub applicant_first_name: String,
    pub applicant_last_name: String,
    pub applicant_phone: Option<String>,
    pub vacancy_title: String,
    pub school_id: i64,
    pub school_name: String,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub vacancy_id: i64,
    pub user_id: Uuid,
    pub feedback: String,
    pub file_paths: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Interview,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::RejectedImmediately,
    ];

    #[test]
    fn only_pending_can_be_decided() {
        for from in ALL {
            for to in ALL {
                let allowed = from.can_transition_to(to);
                let expected = from == ApplicationStatus::Pending
                    && matches!(to, ApplicationStatus::Accepted | ApplicationStatus::Rejected);
                assert_eq!(allowed, expected, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn nothing_returns_to_pending() {
        for from in ALL {
            assert!(!from.can_transition_to(ApplicationStatus::Pending));
        }
    }

    #[test]
    fn decisions_land_on_terminal_states() {
        assert!(Decision::Accepted.target_status().is_terminal());
        assert!(Decision::Rejected.target_status().is_terminal());
        assert!(!ApplicationStatus::Pending.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ApplicationStatus::RejectedImmediately).unwrap();
        assert_eq!(json, "\"rejected_immediately\"");
        let decision: Decision = serde_json::from_str("\"accepted\"").unwrap();
        assert_eq!(decision, Decision::Accepted);
    }
}
