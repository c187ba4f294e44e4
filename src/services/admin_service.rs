use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::{
    school::SchoolSummary,
    school_admin::SchoolAdmin,
    user::{User, UserRole},
};

#[derive(Debug, Clone, Serialize)]
pub struct AssignOutcome {
    pub assignment: SchoolAdmin,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevokeOutcome {
    pub removed: u64,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSchoolRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminEntry {
    #[serde(flatten)]
    pub user: User,
    pub schools: Vec<AdminSchoolRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub admins: Vec<AdminEntry>,
    /// Users that can still be promoted.
    pub candidates: Vec<User>,
    pub schools: Vec<SchoolSummary>,
}

/// Super-admin management of the admin ↔ school associations.
#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn Store>,
}

impl AdminService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn assign(&self, user_id: Uuid, school_id: i64) -> Result<AssignOutcome> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))?;
        if self.store.get_school(school_id).await?.is_none() {
            return Err(Error::NotFound(format!("School {} not found", school_id)));
        }

        let assignment = self.store.insert_school_admin(user_id, school_id).await?;
        tracing::info!(%user_id, school_id, "school admin assigned");

        let mut warnings = Vec::new();
        if user.role != UserRole::Admin {
            match self.store.update_user_role(user_id, UserRole::Admin).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(%user_id, "role update matched no user after assignment");
                    warnings.push("Assignment saved, but the user's role was not updated".to_string());
                }
                Err(e) => {
                    tracing::warn!(%user_id, error = %e, "failed to promote user after assignment");
                    warnings.push(format!(
                        "Assignment saved, but promoting the user failed: {}",
                        e
                    ));
                }
            }
        }

        Ok(AssignOutcome {
            assignment,
            warnings,
        })
    }

    /// Removes every association of the user, then demotes them.
    pub async fn revoke(&self, user_id: Uuid) -> Result<RevokeOutcome> {
        if self.store.get_user(user_id).await?.is_none() {
            return Err(Error::NotFound(format!("User {} not found", user_id)));
        }

        let removed = self.store.delete_school_admins(user_id).await?;
        tracing::info!(%user_id, removed, "school admin associations removed");

        let mut warnings = Vec::new();
        match self.store.update_user_role(user_id, UserRole::User).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(%user_id, "role reset matched no user after revoke");
                warnings.push("Associations removed, but the user's role was not reset".to_string());
            }
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "failed to demote user after revoke");
                warnings.push(format!(
                    "Associations removed, but resetting the role failed: {}",
                    e
                ));
            }
        }

        Ok(RevokeOutcome { removed, warnings })
    }

    pub async fn overview(&self) -> Result<AdminOverview> {
        let users = self.store.list_users().await?;
        let assignments = self.store.list_admin_assignments().await?;
        let schools = self.store.list_school_summaries().await?;

        let mut by_user: HashMap<Uuid, Vec<AdminSchoolRef>> = HashMap::new();
        for a in assignments {
            by_user.entry(a.user_id).or_default().push(AdminSchoolRef {
                id: a.school_id,
                name: a.school_name,
            });
        }

        let mut admins = Vec::new();
        let mut candidates = Vec::new();
        for user in users {
            match user.role {
                UserRole::Admin => {
                    let schools = by_user.remove(&user.id).unwrap_or_default();
                    admins.push(AdminEntry { user, schools });
                }
                UserRole::User => candidates.push(user),
            }
        }

        Ok(AdminOverview {
            admins,
            candidates,
            schools,
        })
    }
}
