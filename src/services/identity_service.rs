use std::sync::Arc;

use crate::database::Store;
use crate::error::{Error, Result};
use crate::models::user::{NewUser, ProfileUpdate, User};
use crate::utils::telegram_auth::TelegramIdentity;

/// Maps verified Telegram identities onto local user records.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn Store>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, identity: &TelegramIdentity) -> Result<Option<User>> {
        self.store.find_user_by_telegram_id(identity.id).await
    }

    /// Looks the caller up, creating a bare profile on first sight.
    pub async fn resolve_or_create(&self, identity: &TelegramIdentity) -> Result<User> {
        if let Some(user) = self.store.find_user_by_telegram_id(identity.id).await? {
            return Ok(user);
        }

        let new_user = NewUser {
            telegram_id: identity.id,
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone().unwrap_or_default(),
            phone_number: None,
        };
        match self.store.insert_user(new_user).await {
            Ok(user) => {
                tracing::info!(telegram_id = identity.id, user_id = %user.id, "created user on first sight");
                Ok(user)
            }
            // Two concurrent first requests from the same account.
            Err(Error::Conflict(_)) => self
                .store
                .find_user_by_telegram_id(identity.id)
                .await?
                .ok_or_else(|| Error::Internal("user vanished after conflict".to_string())),
            Err(e) => Err(e),
        }
    }

    /// Creates or completes the caller's profile with name and phone.
    pub async fn register(
        &self,
        identity: &TelegramIdentity,
        first_name: &str,
        last_name: &str,
        phone_number: &str,
    ) -> Result<User> {
        let profile = ProfileUpdate {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            phone_number: phone_number.trim().to_string(),
        };

        let existing = self.store.find_user_by_telegram_id(identity.id).await?;
        let user = match existing {
            Some(user) => self
                .store
                .update_user_profile(user.id, profile)
                .await?
                .ok_or_else(|| Error::NotFound("User not found".to_string()))?,
            None => {
                self.store
                    .insert_user(NewUser {
                        telegram_id: identity.id,
                        first_name: profile.first_name,
                        last_name: profile.last_name,
                        phone_number: Some(profile.phone_number),
                    })
                    .await?
            }
        };

        tracing::info!(telegram_id = identity.id, user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Resolves the caller and insists the profile carries a phone number.
    pub async fn require_registered(&self, identity: &TelegramIdentity) -> Result<User> {
        let user = self
            .resolve(identity)
            .await?
            .ok_or_else(|| Error::Forbidden("Please register before applying".to_string()))?;
        if !user.is_registered() {
            return Err(Error::Forbidden(
                "Please complete registration before applying".to_string(),
            ));
        }
        Ok(user)
    }
}
