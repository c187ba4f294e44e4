use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct District {
    pub id: i64,
    pub name: String,
    pub region_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDistrict {
    pub name: String,
    pub region_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistrictPatch {
    pub name: Option<String>,
    pub region_id: Option<i64>,
}
