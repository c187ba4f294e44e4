use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::store::Store;
use crate::error::{Error, Result};
use crate::models::{
    application::{Application, ApplicationDetail, ApplicationStatus, NewApplication},
    district::{District, DistrictPatch, NewDistrict},
    region::Region,
    school::{NewSchool, School, SchoolPatch, SchoolSummary},
    school_admin::{AdminAssignment, SchoolAdmin},
    user::{NewUser, ProfileUpdate, User, UserRole},
    vacancy::{NewVacancy, Vacancy, VacancyPatch},
};

const USER_COLUMNS: &str =
    "id, telegram_id, first_name, last_name, phone_number, role, created_at";

const APPLICATION_COLUMNS: &str =
    "id, vacancy_id, user_id, feedback, file_paths, status, admin_comment, created_at, decided_at";

const APPLICATION_DETAIL_SELECT: &str = r#"
    SELECT
        a.id, a.vacancy_id, a.user_id, a.feedback, a.file_paths, a.status,
        a.admin_comment, a.created_at, a.decided_at,
        u.telegram_id AS applicant_telegram_id,
        u.first_name AS applicant_first_name,
        u.last_name AS applicant_last_name,
        u.phone_number AS applicant_phone,
        v.title AS vacancy_title,
        v.school_id,
        s.name AS school_name
    FROM applications a
    JOIN users u ON u.id = a.user_id
    JOIN vacancies v ON v.id = a.vacancy_id
    JOIN schools s ON s.id = v.school_id
"#;

/// `Store` backed by Postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_regions(&self) -> Result<Vec<Region>> {
        let rows = sqlx::query_as::<_, Region>("SELECT id, name FROM regions ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_region(&self, id: i64) -> Result<Option<Region>> {
        let row = sqlx::query_as::<_, Region>("SELECT id, name FROM regions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_districts(&self, region_id: i64) -> Result<Vec<District>> {
        let rows = sqlx::query_as::<_, District>(
            "SELECT id, name, region_id FROM districts WHERE region_id = $1 ORDER BY name ASC",
        )
        .bind(region_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_district(&self, id: i64) -> Result<Option<District>> {
        let row = sqlx::query_as::<_, District>(
            "SELECT id, name, region_id FROM districts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_schools(&self, district_id: i64) -> Result<Vec<School>> {
        let rows = sqlx::query_as::<_, School>(
            "SELECT id, name, district_id FROM schools WHERE district_id = $1 ORDER BY name ASC",
        )
        .bind(district_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_school(&self, id: i64) -> Result<Option<School>> {
        let row = sqlx::query_as::<_, School>(
            "SELECT id, name, district_id FROM schools WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_school_summaries(&self) -> Result<Vec<SchoolSummary>> {
        let rows = sqlx::query_as::<_, SchoolSummary>(
            r#"
            SELECT s.id, s.name, s.district_id, d.name AS district_name
            FROM schools s
            JOIN districts d ON d.id = s.district_id
            ORDER BY d.name ASC, s.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_vacancies(&self, school_id: i64) -> Result<Vec<Vacancy>> {
        let rows = sqlx::query_as::<_, Vacancy>(
            r#"
            SELECT id, title, rate, school_id, created_at
            FROM vacancies
            WHERE school_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_vacancy(&self, id: i64) -> Result<Option<Vacancy>> {
        let row = sqlx::query_as::<_, Vacancy>(
            "SELECT id, title, rate, school_id, created_at FROM vacancies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_district(&self, district: NewDistrict) -> Result<District> {
        let row = sqlx::query_as::<_, District>(
            "INSERT INTO districts (name, region_id) VALUES ($1, $2) RETURNING id, name, region_id",
        )
        .bind(&district.name)
        .bind(district.region_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_district(&self, id: i64, patch: DistrictPatch) -> Result<Option<District>> {
        let row = sqlx::query_as::<_, District>(
            r#"
            UPDATE districts
            SET name = COALESCE($2, name), region_id = COALESCE($3, region_id)
            WHERE id = $1
            RETURNING id, name, region_id
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.region_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_district(&self, id: i64) -> Result<bool> {
        let res = sqlx::query("DELETE FROM districts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_school(&self, school: NewSchool) -> Result<School> {
        let row = sqlx::query_as::<_, School>(
            "INSERT INTO schools (name, district_id) VALUES ($1, $2) RETURNING id, name, district_id",
        )
        .bind(&school.name)
        .bind(school.district_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_school(&self, id: i64, patch: SchoolPatch) -> Result<Option<School>> {
        let row = sqlx::query_as::<_, School>(
            r#"
            UPDATE schools
            SET name = COALESCE($2, name), district_id = COALESCE($3, district_id)
            WHERE id = $1
            RETURNING id, name, district_id
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.district_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_school(&self, id: i64) -> Result<bool> {
        let res = sqlx::query("DELETE FROM schools WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn insert_vacancy(&self, vacancy: NewVacancy) -> Result<Vacancy> {
        let row = sqlx::query_as::<_, Vacancy>(
            r#"
            INSERT INTO vacancies (title, rate, school_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, rate, school_id, created_at
            "#,
        )
        .bind(&vacancy.title)
        .bind(&vacancy.rate)
        .bind(vacancy.school_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_vacancy(&self, id: i64, patch: VacancyPatch) -> Result<Option<Vacancy>> {
        let row = sqlx::query_as::<_, Vacancy>(
            r#"
            UPDATE vacancies
            SET title = COALESCE($2, title), rate = COALESCE($3, rate)
            WHERE id = $1
            RETURNING id, title, rate, school_id, created_at
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.rate)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_vacancy(&self, id: i64) -> Result<bool> {
        let res = sqlx::query("DELETE FROM vacancies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE telegram_id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (telegram_id, first_name, last_name, phone_number, role)
            VALUES ($1, $2, $3, $4, 'user')
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(user.telegram_id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.phone_number)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match Error::from(e) {
                Error::Conflict(_) => Error::Conflict("User is already registered".to_string()),
                other => other,
            })?;
        Ok(row)
    }

    async fn update_user_profile(&self, id: Uuid, profile: ProfileUpdate) -> Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, phone_number = $4
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.phone_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_user_role(&self, id: Uuid, role: UserRole) -> Result<bool> {
        let res = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY first_name ASC, last_name ASC",
            USER_COLUMNS
        );
        let rows = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn insert_school_admin(&self, user_id: Uuid, school_id: i64) -> Result<SchoolAdmin> {
        let row = sqlx::query_as::<_, SchoolAdmin>(
            r#"
            INSERT INTO school_admins (user_id, school_id)
            VALUES ($1, $2)
            RETURNING user_id, school_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(school_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict(
                "This user is already an administrator of this school".to_string(),
            ),
            other => other,
        })?;
        Ok(row)
    }

    async fn list_admin_school_ids(&self, user_id: Uuid) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT school_id FROM school_admins WHERE user_id = $1 ORDER BY school_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn delete_school_admins(&self, user_id: Uuid) -> Result<u64> {
        let res = sqlx::query("DELETE FROM school_admins WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn list_admin_assignments(&self) -> Result<Vec<AdminAssignment>> {
        let rows = sqlx::query_as::<_, AdminAssignment>(
            r#"
            SELECT sa.user_id, sa.school_id, s.name AS school_name
            FROM school_admins sa
            JOIN schools s ON s.id = sa.school_id
            ORDER BY s.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_school_admin_telegram_ids(&self, school_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT u.telegram_id
            FROM school_admins sa
            JOIN users u ON u.id = sa.user_id
            WHERE sa.school_id = $1 AND u.role = 'admin'
            "#,
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn insert_application(&self, application: NewApplication) -> Result<Application> {
        let sql = format!(
            r#"
            INSERT INTO applications (vacancy_id, user_id, feedback, file_paths, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let row = sqlx::query_as::<_, Application>(&sql)
            .bind(application.vacancy_id)
            .bind(application.user_id)
            .bind(&application.feedback)
            .bind(&application.file_paths)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_application_detail(&self, id: Uuid) -> Result<Option<ApplicationDetail>> {
        let sql = format!("{} WHERE a.id = $1", APPLICATION_DETAIL_SELECT);
        let row = sqlx::query_as::<_, ApplicationDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_applications_for_schools(
        &self,
        school_ids: &[i64],
    ) -> Result<Vec<ApplicationDetail>> {
        let sql = format!(
            "{} WHERE v.school_id = ANY($1) ORDER BY a.created_at DESC",
            APPLICATION_DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, ApplicationDetail>(&sql)
            .bind(school_ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_user_applications(&self, user_id: Uuid) -> Result<Vec<ApplicationDetail>> {
        let sql = format!(
            "{} WHERE a.user_id = $1 ORDER BY a.created_at DESC",
            APPLICATION_DETAIL_SELECT
        );
        let rows = sqlx::query_as::<_, ApplicationDetail>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn transition_application(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
        admin_comment: Option<String>,
    ) -> Result<Option<Application>> {
        let sql = format!(
            r#"
            UPDATE applications
            SET status = $3, admin_comment = $4, decided_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let row = sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .bind(admin_comment)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
