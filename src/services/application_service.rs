use bytes::Bytes;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationDetail, NewApplication};
use crate::models::user::User;
use crate::services::notification_service::NotificationService;
use crate::services::storage_service::BlobStore;

const ALLOWED_EXTENSIONS: [&str; 9] = ["pdf", "doc", "docx", "txt", "rtf", "jpg", "jpeg", "png", "webp"];

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy)]
pub struct AttachmentPolicy {
    pub require_attachment: bool,
    pub max_attachments: usize,
    pub max_file_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub application: Application,
    pub warnings: Vec<String>,
}

/// Reduces a client-supplied name to its last path component.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }
    Some(cleaned.to_string())
}

fn check_content(file_name: &str, data: &[u8]) -> Result<()> {
    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!(
            "File type of {} is not allowed",
            file_name
        )));
    }
    if data.is_empty() {
        return Err(Error::BadRequest(format!("File {} is empty", file_name)));
    }

    let valid = match ext.as_str() {
        "pdf" => data.starts_with(b"%PDF"),
        "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8]),
        "png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        _ => true,
    };
    if !valid {
        return Err(Error::BadRequest(format!(
            "Content of {} does not match its extension",
            file_name
        )));
    }
    Ok(())
}

impl AttachmentPolicy {
    /// Validates the batch and returns it with sanitised names.
    pub fn check(&self, files: Vec<Attachment>) -> Result<Vec<Attachment>> {
        if self.require_attachment && files.is_empty() {
            return Err(Error::BadRequest(
                "At least one attachment is required".to_string(),
            ));
        }
        if files.len() > self.max_attachments {
            return Err(Error::BadRequest(format!(
                "At most {} attachments are allowed",
                self.max_attachments
            )));
        }

        let mut seen = HashSet::new();
        let mut checked = Vec::with_capacity(files.len());
        for file in files {
            let file_name = sanitize_file_name(&file.file_name).ok_or_else(|| {
                Error::BadRequest(format!("Invalid file name: {}", file.file_name))
            })?;
            if !seen.insert(file_name.to_lowercase()) {
                return Err(Error::BadRequest(format!(
                    "File {} was attached twice",
                    file_name
                )));
            }
            if file.data.len() > self.max_file_bytes {
                return Err(Error::BadRequest(format!("File {} is too large", file_name)));
            }
            check_content(&file_name, &file.data)?;
            checked.push(Attachment {
                file_name,
                data: file.data,
            });
        }
        Ok(checked)
    }
}

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
    notifications: NotificationService,
    policy: AttachmentPolicy,
}

impl ApplicationService {
    pub fn new(
        store: Arc<dyn Store>,
        blobs: Arc<dyn BlobStore>,
        notifications: NotificationService,
        policy: AttachmentPolicy,
    ) -> Self {
        Self {
            store,
            blobs,
            notifications,
            policy,
        }
    }

    /// `applications/{user}/{vacancy}/{attempt}/{file}`; one folder per submission attempt.
    pub fn blob_path(user: &User, vacancy_id: i64, attempt: Uuid, file_name: &str) -> String {
        format!(
            "applications/{}/{}/{}/{}",
            user.id, vacancy_id, attempt, file_name
        )
    }

    async fn discard(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.blobs.remove(path).await {
                tracing::warn!(path = %path, error = %e, "could not remove orphaned attachment");
            }
        }
    }

    /// Uploads the attachments, records a pending application and pings the
    /// school's admins. Admin notification failures only produce warnings.
    pub async fn submit(
        &self,
        user: &User,
        vacancy_id: i64,
        feedback: String,
        files: Vec<Attachment>,
    ) -> Result<SubmitOutcome> {
        if !user.is_registered() {
            return Err(Error::Forbidden(
                "Please complete registration before applying".to_string(),
            ));
        }

        let vacancy = self
            .store
            .get_vacancy(vacancy_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Vacancy {} not found", vacancy_id)))?;
        let files = self.policy.check(files)?;

        let attempt = Uuid::new_v4();
        let mut file_paths = Vec::with_capacity(files.len());
        for file in files {
            let path = Self::blob_path(user, vacancy_id, attempt, &file.file_name);
            if let Err(e) = self.blobs.upload(&path, file.data).await {
                tracing::error!(user_id = %user.id, vacancy_id, path = %path, error = %e, "attachment upload failed");
                self.discard(&file_paths).await;
                return Err(e);
            }
            file_paths.push(path);
        }

        let inserted = self
            .store
            .insert_application(NewApplication {
                vacancy_id,
                user_id: user.id,
                feedback: feedback.trim().to_string(),
                file_paths: file_paths.clone(),
            })
            .await;
        let application = match inserted {
            Ok(application) => application,
            Err(e) => {
                tracing::error!(user_id = %user.id, vacancy_id, error = %e, "failed to record application");
                self.discard(&file_paths).await;
                return Err(e);
            }
        };
        tracing::info!(
            application_id = %application.id,
            user_id = %user.id,
            vacancy_id,
            files = application.file_paths.len(),
            "application submitted"
        );

        let warnings = self.notify_admins(user, vacancy.school_id, &vacancy.title).await;
        Ok(SubmitOutcome {
            application,
            warnings,
        })
    }

    async fn notify_admins(&self, user: &User, school_id: i64, vacancy_title: &str) -> Vec<String> {
        let school_name = match self.store.get_school(school_id).await {
            Ok(Some(school)) => school.name,
            _ => String::new(),
        };
        let admin_ids = match self.store.list_school_admin_telegram_ids(school_id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(school_id, error = %e, "could not load school admins to notify");
                return vec!["School administrators could not be notified".to_string()];
            }
        };

        let failed = self
            .notifications
            .notify_new_application(&admin_ids, vacancy_title, &school_name, &user.full_name())
            .await;
        if failed.is_empty() {
            Vec::new()
        } else {
            vec![format!(
                "{} of {} school administrators could not be notified",
                failed.len(),
                admin_ids.len()
            )]
        }
    }

    pub async fn list_mine(&self, user: &User) -> Result<Vec<ApplicationDetail>> {
        self.store.list_user_applications(user.id).await
    }
}
