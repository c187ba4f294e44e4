use std::sync::Arc;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::user::{User, UserRole};
use crate::utils::telegram_auth::TelegramIdentity;

/// What a caller may administer. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminScope {
    NotAdmin,
    /// `role = admin` without any school association.
    Unassigned { user: User },
    Schools { user: User, school_ids: Vec<i64> },
}

impl AdminScope {
    pub fn is_admin(&self) -> bool {
        match self {
            AdminScope::NotAdmin => false,
            AdminScope::Unassigned { .. } | AdminScope::Schools { .. } => true,
        }
    }

    pub fn school_ids(&self) -> &[i64] {
        match self {
            AdminScope::Schools { school_ids, .. } => school_ids,
            AdminScope::NotAdmin | AdminScope::Unassigned { .. } => &[],
        }
    }

    pub fn covers(&self, school_id: i64) -> bool {
        self.school_ids().contains(&school_id)
    }

    /// The admin and their schools, or the access error for this scope.
    pub fn require_schools(self) -> Result<(User, Vec<i64>)> {
        match self {
            AdminScope::NotAdmin => Err(Error::Forbidden(
                "Administrator access required".to_string(),
            )),
            AdminScope::Unassigned { .. } => Err(Error::NoAssignedSchools),
            AdminScope::Schools { user, school_ids } => Ok((user, school_ids)),
        }
    }
}

#[derive(Clone)]
pub struct AdminScopeService {
    store: Arc<dyn Store>,
}

impl AdminScopeService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, identity: &TelegramIdentity) -> Result<AdminScope> {
        match self.store.find_user_by_telegram_id(identity.id).await? {
            Some(user) => self.resolve_user(user).await,
            None => Ok(AdminScope::NotAdmin),
        }
    }

    pub async fn resolve_user(&self, user: User) -> Result<AdminScope> {
        let mut school_ids = self.store.list_admin_school_ids(user.id).await?;
        school_ids.sort_unstable();
        school_ids.dedup();

        match (user.role, school_ids.is_empty()) {
            (UserRole::User, true) => Ok(AdminScope::NotAdmin),
            (UserRole::User, false) => {
                tracing::warn!(
                    user_id = %user.id,
                    schools = school_ids.len(),
                    "user without admin role still has school associations"
                );
                Ok(AdminScope::NotAdmin)
            }
            (UserRole::Admin, true) => {
                tracing::warn!(user_id = %user.id, "admin has no assigned schools");
                Ok(AdminScope::Unassigned { user })
            }
            (UserRole::Admin, false) => Ok(AdminScope::Schools { user, school_ids }),
        }
    }
}
