use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignAdminPayload {
    pub user_id: Uuid,
    pub school_id: i64,
}

/// `{isAdmin, schoolIds}` view of the caller's admin scope.
#[derive(Debug, Clone, Serialize)]
pub struct AdminScopeResponse {
    pub is_admin: bool,
    pub school_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
