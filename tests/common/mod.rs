#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use school_vacancy_portal::config::{Config, LogFormat};
use school_vacancy_portal::database::Store;
use school_vacancy_portal::error::{Error, Result};
use school_vacancy_portal::models::{
    application::{Application, ApplicationDetail, ApplicationStatus, NewApplication},
    district::{District, DistrictPatch, NewDistrict},
    region::Region,
    school::{NewSchool, School, SchoolPatch, SchoolSummary},
    school_admin::{AdminAssignment, SchoolAdmin},
    user::{NewUser, ProfileUpdate, User, UserRole},
    vacancy::{NewVacancy, Vacancy, VacancyPatch},
};
use school_vacancy_portal::services::notification_service::{Notifier, OutgoingMessage};
use school_vacancy_portal::services::storage_service::BlobStore;
use school_vacancy_portal::utils::telegram_auth::sign_fields;
use school_vacancy_portal::AppState;

pub const BOT_TOKEN: &str = "123456:TEST-TOKEN";
pub const SUPER_ADMIN_TG: i64 = 9_000;

pub fn test_config() -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        database_url: "postgres://unused".into(),
        telegram_bot_token: BOT_TOKEN.into(),
        telegram_api_url: "http://telegram.invalid".into(),
        telegram_webhook_secret: Some("hook-secret".into()),
        webapp_url: Some("https://app.example".into()),
        init_data_max_age_secs: 3600,
        super_admin_telegram_ids: vec![SUPER_ADMIN_TG],
        uploads_dir: PathBuf::from("/tmp/unused"),
        public_base_url: "https://portal.example".into(),
        require_attachment: false,
        max_attachments: 5,
        max_upload_bytes: 1024 * 1024,
        public_rps: 1000,
        admin_rps: 1000,
        log_format: LogFormat::Text,
    }
}

/// Init data signed for `telegram_id`, issued now.
pub fn init_data_for(telegram_id: i64, first_name: &str) -> String {
    let user = serde_json::json!({
        "id": telegram_id,
        "first_name": first_name,
        "last_name": "Testov",
    })
    .to_string();
    let auth_date = Utc::now().timestamp().to_string();
    let fields = vec![
        ("auth_date".to_string(), auth_date),
        ("query_id".to_string(), "AAEtest".to_string()),
        ("user".to_string(), user),
    ];
    let hash = sign_fields(&fields, BOT_TOKEN).unwrap();
    let mut ser = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in &fields {
        ser.append_pair(k, v);
    }
    ser.append_pair("hash", &hash);
    ser.finish()
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    next_id: i64,
    tick: i64,
    regions: Vec<Region>,
    districts: Vec<District>,
    schools: Vec<School>,
    vacancies: Vec<Vacancy>,
    users: Vec<User>,
    school_admins: Vec<SchoolAdmin>,
    applications: Vec<Application>,
}

impl Tables {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Strictly increasing timestamps so ordering is deterministic.
    fn stamp(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(self.tick)
    }

    fn detail(&self, a: &Application) -> Option<ApplicationDetail> {
        let user = self.users.iter().find(|u| u.id == a.user_id)?;
        let vacancy = self.vacancies.iter().find(|v| v.id == a.vacancy_id)?;
        let school = self.schools.iter().find(|s| s.id == vacancy.school_id)?;
        Some(ApplicationDetail {
            id: a.id,
            vacancy_id: a.vacancy_id,
            user_id: a.user_id,
            feedback: a.feedback.clone(),
            file_paths: a.file_paths.clone(),
            status: a.status,
            admin_comment: a.admin_comment.clone(),
            created_at: a.created_at,
            decided_at: a.decided_at,
            applicant_telegram_id: user.telegram_id,
            applicant_first_name: user.first_name.clone(),
            applicant_last_name: user.last_name.clone(),
            applicant_phone: user.phone_number.clone(),
            vacancy_title: vacancy.title.clone(),
            school_id: school.id,
            school_name: school.name.clone(),
        })
    }

    fn newest_first(&self, keep: impl Fn(&ApplicationDetail) -> bool) -> Vec<ApplicationDetail> {
        let mut rows: Vec<ApplicationDetail> = self
            .applications
            .iter()
            .filter_map(|a| self.detail(a))
            .filter(|d| keep(d))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

/// Knobs for simulating persistence failures.
#[derive(Default)]
pub struct Failures {
    pub list_applications: AtomicBool,
    pub role_update: AtomicBool,
    pub insert_application: AtomicBool,
    /// The next conditional transition loses a race against another admin.
    pub steal_next_transition: AtomicBool,
    /// The first detail read after a successful transition fails.
    pub reread_after_transition: AtomicBool,
    reread_armed: AtomicBool,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    pub failures: Failures,
}

fn unavailable() -> Error {
    Error::Unavailable("simulated outage".to_string())
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_region(&self, name: &str) -> Region {
        let mut t = self.tables.lock().unwrap();
        let region = Region {
            id: t.id(),
            name: name.into(),
        };
        t.regions.push(region.clone());
        region
    }

    pub fn add_district(&self, region_id: i64, name: &str) -> District {
        let mut t = self.tables.lock().unwrap();
        let district = District {
            id: t.id(),
            name: name.into(),
            region_id,
        };
        t.districts.push(district.clone());
        district
    }

    pub fn add_school(&self, district_id: i64, name: &str) -> School {
        let mut t = self.tables.lock().unwrap();
        let school = School {
            id: t.id(),
            name: name.into(),
            district_id,
        };
        t.schools.push(school.clone());
        school
    }

    pub fn add_vacancy(&self, school_id: i64, title: &str) -> Vacancy {
        let mut t = self.tables.lock().unwrap();
        let vacancy = Vacancy {
            id: t.id(),
            title: title.into(),
            rate: "1.0".into(),
            school_id,
            created_at: t.stamp(),
        };
        t.vacancies.push(vacancy.clone());
        vacancy
    }

    pub fn add_user(&self, telegram_id: i64, first_name: &str, role: UserRole) -> User {
        let mut t = self.tables.lock().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            telegram_id,
            first_name: first_name.into(),
            last_name: "Testov".into(),
            phone_number: Some(format!("+99890{:07}", telegram_id)),
            role,
            created_at: t.stamp(),
        };
        t.users.push(user.clone());
        user
    }

    pub fn link_admin(&self, user_id: Uuid, school_id: i64) {
        let mut t = self.tables.lock().unwrap();
        let created_at = t.stamp();
        t.school_admins.push(SchoolAdmin {
            user_id,
            school_id,
            created_at,
        });
    }

    pub fn add_application(&self, user_id: Uuid, vacancy_id: i64) -> Application {
        let mut t = self.tables.lock().unwrap();
        let application = Application {
            id: Uuid::new_v4(),
            vacancy_id,
            user_id,
            feedback: "Men tajribali o'qituvchiman".into(),
            file_paths: vec![format!("applications/{}/{}/cv.pdf", user_id, vacancy_id)],
            status: ApplicationStatus::Pending,
            admin_comment: None,
            created_at: t.stamp(),
            decided_at: None,
        };
        t.applications.push(application.clone());
        application
    }

    pub fn application(&self, id: Uuid) -> Option<Application> {
        let t = self.tables.lock().unwrap();
        t.applications.iter().find(|a| a.id == id).cloned()
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        let t = self.tables.lock().unwrap();
        t.users.iter().find(|u| u.id == id).cloned()
    }

    pub fn application_count(&self) -> usize {
        self.tables.lock().unwrap().applications.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_regions(&self) -> Result<Vec<Region>> {
        let t = self.tables.lock().unwrap();
        let mut rows = t.regions.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_region(&self, id: i64) -> Result<Option<Region>> {
        let t = self.tables.lock().unwrap();
        Ok(t.regions.iter().find(|r| r.id == id).cloned())
    }

    async fn list_districts(&self, region_id: i64) -> Result<Vec<District>> {
        let t = self.tables.lock().unwrap();
        Ok(t.districts
            .iter()
            .filter(|d| d.region_id == region_id)
            .cloned()
            .collect())
    }

    async fn get_district(&self, id: i64) -> Result<Option<District>> {
        let t = self.tables.lock().unwrap();
        Ok(t.districts.iter().find(|d| d.id == id).cloned())
    }

    async fn list_schools(&self, district_id: i64) -> Result<Vec<School>> {
        let t = self.tables.lock().unwrap();
        Ok(t.schools
            .iter()
            .filter(|s| s.district_id == district_id)
            .cloned()
            .collect())
    }

    async fn get_school(&self, id: i64) -> Result<Option<School>> {
        let t = self.tables.lock().unwrap();
        Ok(t.schools.iter().find(|s| s.id == id).cloned())
    }

    async fn list_school_summaries(&self) -> Result<Vec<SchoolSummary>> {
        let t = self.tables.lock().unwrap();
        Ok(t.schools
            .iter()
            .map(|s| SchoolSummary {
                id: s.id,
                name: s.name.clone(),
                district_id: s.district_id,
                district_name: t
                    .districts
                    .iter()
                    .find(|d| d.id == s.district_id)
                    .map(|d| d.name.clone())
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn list_vacancies(&self, school_id: i64) -> Result<Vec<Vacancy>> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<Vacancy> = t
            .vacancies
            .iter()
            .filter(|v| v.school_id == school_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_vacancy(&self, id: i64) -> Result<Option<Vacancy>> {
        let t = self.tables.lock().unwrap();
        Ok(t.vacancies.iter().find(|v| v.id == id).cloned())
    }

    async fn insert_district(&self, district: NewDistrict) -> Result<District> {
        let mut t = self.tables.lock().unwrap();
        let row = District {
            id: t.id(),
            name: district.name,
            region_id: district.region_id,
        };
        t.districts.push(row.clone());
        Ok(row)
    }

    async fn update_district(&self, id: i64, patch: DistrictPatch) -> Result<Option<District>> {
        let mut t = self.tables.lock().unwrap();
        Ok(t.districts.iter_mut().find(|d| d.id == id).map(|d| {
            if let Some(name) = patch.name {
                d.name = name;
            }
            if let Some(region_id) = patch.region_id {
                d.region_id = region_id;
            }
            d.clone()
        }))
    }

    async fn delete_district(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.lock().unwrap();
        let before = t.districts.len();
        t.districts.retain(|d| d.id != id);
        Ok(t.districts.len() != before)
    }

    async fn insert_school(&self, school: NewSchool) -> Result<School> {
        let mut t = self.tables.lock().unwrap();
        let row = School {
            id: t.id(),
            name: school.name,
            district_id: school.district_id,
        };
        t.schools.push(row.clone());
        Ok(row)
    }

    async fn update_school(&self, id: i64, patch: SchoolPatch) -> Result<Option<School>> {
        let mut t = self.tables.lock().unwrap();
        Ok(t.schools.iter_mut().find(|s| s.id == id).map(|s| {
            if let Some(name) = patch.name {
                s.name = name;
            }
            if let Some(district_id) = patch.district_id {
                s.district_id = district_id;
            }
            s.clone()
        }))
    }

    async fn delete_school(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.lock().unwrap();
        let before = t.schools.len();
        t.schools.retain(|s| s.id != id);
        Ok(t.schools.len() != before)
    }

    async fn insert_vacancy(&self, vacancy: NewVacancy) -> Result<Vacancy> {
        let mut t = self.tables.lock().unwrap();
        let row = Vacancy {
            id: t.id(),
            title: vacancy.title,
            rate: vacancy.rate,
            school_id: vacancy.school_id,
            created_at: t.stamp(),
        };
        t.vacancies.push(row.clone());
        Ok(row)
    }

    async fn update_vacancy(&self, id: i64, patch: VacancyPatch) -> Result<Option<Vacancy>> {
        let mut t = self.tables.lock().unwrap();
        Ok(t.vacancies.iter_mut().find(|v| v.id == id).map(|v| {
            if let Some(title) = patch.title {
                v.title = title;
            }
            if let Some(rate) = patch.rate {
                v.rate = rate;
            }
            v.clone()
        }))
    }

    async fn delete_vacancy(&self, id: i64) -> Result<bool> {
        let mut t = self.tables.lock().unwrap();
        let before = t.vacancies.len();
        t.vacancies.retain(|v| v.id != id);
        Ok(t.vacancies.len() != before)
    }

    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.telegram_id == telegram_id).cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.telegram_id == user.telegram_id) {
            return Err(Error::Conflict("User is already registered".into()));
        }
        let row = User {
            id: Uuid::new_v4(),
            telegram_id: user.telegram_id,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            role: UserRole::User,
            created_at: t.stamp(),
        };
        t.users.push(row.clone());
        Ok(row)
    }

    async fn update_user_profile(&self, id: Uuid, profile: ProfileUpdate) -> Result<Option<User>> {
        let mut t = self.tables.lock().unwrap();
        Ok(t.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.first_name = profile.first_name;
            u.last_name = profile.last_name;
            u.phone_number = Some(profile.phone_number);
            u.clone()
        }))
    }

    async fn update_user_role(&self, id: Uuid, role: UserRole) -> Result<bool> {
        if self.failures.role_update.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut t = self.tables.lock().unwrap();
        match t.users.iter_mut().find(|u| u.id == id) {
            Some(u) => {
                u.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.tables.lock().unwrap().users.clone())
    }

    async fn insert_school_admin(&self, user_id: Uuid, school_id: i64) -> Result<SchoolAdmin> {
        let mut t = self.tables.lock().unwrap();
        if t
            .school_admins
            .iter()
            .any(|sa| sa.user_id == user_id && sa.school_id == school_id)
        {
            return Err(Error::Conflict(
                "This user is already an administrator of this school".into(),
            ));
        }
        let row = SchoolAdmin {
            user_id,
            school_id,
            created_at: t.stamp(),
        };
        t.school_admins.push(row.clone());
        Ok(row)
    }

    async fn list_admin_school_ids(&self, user_id: Uuid) -> Result<Vec<i64>> {
        let t = self.tables.lock().unwrap();
        Ok(t.school_admins
            .iter()
            .filter(|sa| sa.user_id == user_id)
            .map(|sa| sa.school_id)
            .collect())
    }

    async fn delete_school_admins(&self, user_id: Uuid) -> Result<u64> {
        let mut t = self.tables.lock().unwrap();
        let before = t.school_admins.len();
        t.school_admins.retain(|sa| sa.user_id != user_id);
        Ok((before - t.school_admins.len()) as u64)
    }

    async fn list_admin_assignments(&self) -> Result<Vec<AdminAssignment>> {
        let t = self.tables.lock().unwrap();
        Ok(t.school_admins
            .iter()
            .map(|sa| AdminAssignment {
                user_id: sa.user_id,
                school_id: sa.school_id,
                school_name: t
                    .schools
                    .iter()
                    .find(|s| s.id == sa.school_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn list_school_admin_telegram_ids(&self, school_id: i64) -> Result<Vec<i64>> {
        let t = self.tables.lock().unwrap();
        Ok(t.school_admins
            .iter()
            .filter(|sa| sa.school_id == school_id)
            .filter_map(|sa| t.users.iter().find(|u| u.id == sa.user_id))
            .filter(|u| u.role == UserRole::Admin)
            .map(|u| u.telegram_id)
            .collect())
    }

    async fn insert_application(&self, application: NewApplication) -> Result<Application> {
        if self.failures.insert_application.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut t = self.tables.lock().unwrap();
        let row = Application {
            id: Uuid::new_v4(),
            vacancy_id: application.vacancy_id,
            user_id: application.user_id,
            feedback: application.feedback,
            file_paths: application.file_paths,
            status: ApplicationStatus::Pending,
            admin_comment: None,
            created_at: t.stamp(),
            decided_at: None,
        };
        t.applications.push(row.clone());
        Ok(row)
    }

    async fn get_application_detail(&self, id: Uuid) -> Result<Option<ApplicationDetail>> {
        if self.failures.reread_armed.swap(false, Ordering::SeqCst) {
            return Err(unavailable());
        }
        let t = self.tables.lock().unwrap();
        Ok(t.applications
            .iter()
            .find(|a| a.id == id)
            .and_then(|a| t.detail(a)))
    }

    async fn list_applications_for_schools(
        &self,
        school_ids: &[i64],
    ) -> Result<Vec<ApplicationDetail>> {
        if self.failures.list_applications.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let t = self.tables.lock().unwrap();
        Ok(t.newest_first(|d| school_ids.contains(&d.school_id)))
    }

    async fn list_user_applications(&self, user_id: Uuid) -> Result<Vec<ApplicationDetail>> {
        let t = self.tables.lock().unwrap();
        Ok(t.newest_first(|d| d.user_id == user_id))
    }

    async fn transition_application(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
        admin_comment: Option<String>,
    ) -> Result<Option<Application>> {
        let mut t = self.tables.lock().unwrap();
        let stamp = t.stamp();
        let Some(app) = t.applications.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if self.failures.steal_next_transition.swap(false, Ordering::SeqCst) {
            app.status = ApplicationStatus::Rejected;
            app.admin_comment = Some("decided elsewhere".into());
            app.decided_at = Some(stamp);
        }
        if app.status != from {
            return Ok(None);
        }
        app.status = to;
        app.admin_comment = admin_comment;
        app.decided_at = Some(stamp);
        if self.failures.reread_after_transition.load(Ordering::SeqCst) {
            self.failures.reread_armed.store(true, Ordering::SeqCst);
        }
        Ok(Some(app.clone()))
    }
}

// ---------------------------------------------------------------------------
// Blob store and notifier doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryBlobStore {
    pub objects: Mutex<HashMap<String, Bytes>>,
    pub fail_uploads: AtomicBool,
    /// Uploads whose path ends with this name fail.
    pub fail_file: Mutex<Option<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, data: Bytes) -> Result<()> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        if let Some(name) = self.fail_file.lock().unwrap().as_deref() {
            if path.ends_with(name) {
                return Err(unavailable());
            }
        }
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(path) {
            return Err(Error::Conflict(format!("File already exists: {}", path)));
        }
        objects.insert(path.to_string(), data);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://blobs.example/{}", path)
    }
}

/// Records every message; can be switched to fail like a 500 from the bot API.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<OutgoingMessage>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(&self, message: OutgoingMessage) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Upstream("Telegram sendMessage returned 500".into()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// A region → district → two schools world with one admin on school `a`.
pub struct World {
    pub store: Arc<MemoryStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub state: AppState,
    pub region: Region,
    pub district: District,
    pub school_a: School,
    pub school_b: School,
    pub vacancy_a: Vacancy,
    pub vacancy_b: Vacancy,
    pub admin: User,
    pub applicant: User,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = MemoryStore::new();
        let blobs = MemoryBlobStore::new();
        let notifier = RecordingNotifier::new();

        let region = store.add_region("Toshkent shahri");
        let district = store.add_district(region.id, "Chilonzor");
        let school_a = store.add_school(district.id, "1-maktab");
        let school_b = store.add_school(district.id, "2-maktab");
        let vacancy_a = store.add_vacancy(school_a.id, "Matematika o'qituvchisi");
        let vacancy_b = store.add_vacancy(school_b.id, "Ingliz tili o'qituvchisi");
        let admin = store.add_user(100, "Aziz", UserRole::Admin);
        store.link_admin(admin.id, school_a.id);
        let applicant = store.add_user(200, "Dilnoza", UserRole::User);

        let state = AppState::new(config, store.clone(), blobs.clone(), notifier.clone());
        Self {
            store,
            blobs,
            notifier,
            state,
            region,
            district,
            school_a,
            school_b,
            vacancy_a,
            vacancy_b,
            admin,
            applicant,
        }
    }

    pub fn router(&self) -> Router {
        school_vacancy_portal::routes::router(self.state.clone())
    }
}
