use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::User;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 7, max = 20))]
    pub phone_number: String,
}

impl RegisterPayload {
    /// Digits with an optional leading `+` and common separators.
    pub fn phone_is_plausible(&self) -> bool {
        let phone = self.phone_number.trim();
        let body = phone.strip_prefix('+').unwrap_or(phone);
        let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
        digits >= 7
            && body
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub registered: bool,
    pub is_admin: bool,
    pub is_super_admin: bool,
}
