use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SchoolAdmin {
    pub user_id: Uuid,
    pub school_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Association row joined with the school name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AdminAssignment {
    pub user_id: Uuid,
    pub school_id: i64,
    pub school_name: String,
}
