pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::Store;
use crate::services::{
    admin_scope_service::AdminScopeService,
    admin_service::AdminService,
    application_service::{ApplicationService, AttachmentPolicy},
    hierarchy_service::HierarchyService,
    identity_service::IdentityService,
    notification_service::{NotificationService, Notifier},
    review_service::ReviewService,
    storage_service::BlobStore,
    vacancy_service::VacancyService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
    pub identity_service: IdentityService,
    pub hierarchy_service: HierarchyService,
    pub vacancy_service: VacancyService,
    pub admin_scope_service: AdminScopeService,
    pub admin_service: AdminService,
    pub application_service: ApplicationService,
    pub review_service: ReviewService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let notification_service = NotificationService::new(notifier);
        let policy = AttachmentPolicy {
            require_attachment: config.require_attachment,
            max_attachments: config.max_attachments,
            max_file_bytes: config.max_upload_bytes,
        };

        Self {
            identity_service: IdentityService::new(store.clone()),
            hierarchy_service: HierarchyService::new(store.clone()),
            vacancy_service: VacancyService::new(store.clone()),
            admin_scope_service: AdminScopeService::new(store.clone()),
            admin_service: AdminService::new(store.clone()),
            application_service: ApplicationService::new(
                store.clone(),
                blobs.clone(),
                notification_service.clone(),
                policy,
            ),
            review_service: ReviewService::new(store.clone(), blobs, notification_service.clone()),
            notification_service,
            store,
            config: Arc::new(config),
        }
    }
}
