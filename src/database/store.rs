use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    application::{Application, ApplicationDetail, ApplicationStatus, NewApplication},
    district::{District, DistrictPatch, NewDistrict},
    region::Region,
    school::{NewSchool, School, SchoolPatch, SchoolSummary},
    school_admin::{AdminAssignment, SchoolAdmin},
    user::{NewUser, ProfileUpdate, User, UserRole},
    vacancy::{NewVacancy, Vacancy, VacancyPatch},
};

/// Persistence gateway used by every service.
///
/// Each method is a single statement against the backing store. Callers never
/// group calls into transactions and must tolerate partial completion.
#[async_trait]
pub trait Store: Send + Sync {
    // Hierarchy
    async fn list_regions(&self) -> Result<Vec<Region>>;
    async fn get_region(&self, id: i64) -> Result<Option<Region>>;
    async fn list_districts(&self, region_id: i64) -> Result<Vec<District>>;
    async fn get_district(&self, id: i64) -> Result<Option<District>>;
    async fn list_schools(&self, district_id: i64) -> Result<Vec<School>>;
    async fn get_school(&self, id: i64) -> Result<Option<School>>;
    async fn list_school_summaries(&self) -> Result<Vec<SchoolSummary>>;
    async fn list_vacancies(&self, school_id: i64) -> Result<Vec<Vacancy>>;
    async fn get_vacancy(&self, id: i64) -> Result<Option<Vacancy>>;

    // Catalog
    async fn insert_district(&self, district: NewDistrict) -> Result<District>;
    async fn update_district(&self, id: i64, patch: DistrictPatch) -> Result<Option<District>>;
    async fn delete_district(&self, id: i64) -> Result<bool>;
    async fn insert_school(&self, school: NewSchool) -> Result<School>;
    async fn update_school(&self, id: i64, patch: SchoolPatch) -> Result<Option<School>>;
    async fn delete_school(&self, id: i64) -> Result<bool>;

    // Vacancies
    async fn insert_vacancy(&self, vacancy: NewVacancy) -> Result<Vacancy>;
    async fn update_vacancy(&self, id: i64, patch: VacancyPatch) -> Result<Option<Vacancy>>;
    async fn delete_vacancy(&self, id: i64) -> Result<bool>;

    // Users
    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    /// Fails with `Error::Conflict` when the Telegram id is already known.
    async fn insert_user(&self, user: NewUser) -> Result<User>;
    async fn update_user_profile(&self, id: Uuid, profile: ProfileUpdate) -> Result<Option<User>>;
    async fn update_user_role(&self, id: Uuid, role: UserRole) -> Result<bool>;
    async fn list_users(&self) -> Result<Vec<User>>;

    // School admins
    /// Fails with `Error::Conflict` when the pair already exists.
    async fn insert_school_admin(&self, user_id: Uuid, school_id: i64) -> Result<SchoolAdmin>;
    async fn list_admin_school_ids(&self, user_id: Uuid) -> Result<Vec<i64>>;
    async fn delete_school_admins(&self, user_id: Uuid) -> Result<u64>;
    async fn list_admin_assignments(&self) -> Result<Vec<AdminAssignment>>;
    async fn list_school_admin_telegram_ids(&self, school_id: i64) -> Result<Vec<i64>>;

    // Applications
    /// Inserts a new application in the `pending` state.
    async fn insert_application(&self, application: NewApplication) -> Result<Application>;
    async fn get_application_detail(&self, id: Uuid) -> Result<Option<ApplicationDetail>>;
    /// Applications whose vacancy belongs to one of `school_ids`, newest first.
    async fn list_applications_for_schools(
        &self,
        school_ids: &[i64],
    ) -> Result<Vec<ApplicationDetail>>;
    async fn list_user_applications(&self, user_id: Uuid) -> Result<Vec<ApplicationDetail>>;
    /// Conditional status write: only applies while the stored status equals `from`.
    /// Returns `None` when the row is missing or its status has moved on.
    async fn transition_application(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
        admin_comment: Option<String>,
    ) -> Result<Option<Application>>;
}
