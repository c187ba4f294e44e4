use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Vacancy {
    pub id: i64,
    pub title: String,
    pub rate: String,
    pub school_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVacancy {
    pub title: String,
    pub rate: String,
    pub school_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct VacancyPatch {
    pub title: Option<String>,
    pub rate: Option<String>,
}
