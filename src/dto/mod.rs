pub mod admin_dto;
pub mod application_dto;
pub mod catalog_dto;
pub mod user_dto;
pub mod vacancy_dto;
pub mod webhook_dto;
