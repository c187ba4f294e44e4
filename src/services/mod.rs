pub mod admin_scope_service;
pub mod admin_service;
pub mod application_service;
pub mod hierarchy_service;
pub mod identity_service;
pub mod notification_service;
pub mod review_service;
pub mod storage_service;
pub mod telegram_service;
pub mod vacancy_service;
