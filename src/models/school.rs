use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct School {
    pub id: i64,
    pub name: String,
    pub district_id: i64,
}

/// School row joined with its district, used by the catalog screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SchoolSummary {
    pub id: i64,
    pub name: String,
    pub district_id: i64,
    pub district_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSchool {
    pub name: String,
    pub district_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolPatch {
    pub name: Option<String>,
    pub district_id: Option<i64>,
}
