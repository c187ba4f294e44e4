use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// User identity carried by a verified mini-app init-data payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramIdentity {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitData {
    pub user: TelegramIdentity,
    pub auth_date: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitDataError {
    #[error("init data has no hash")]
    MissingHash,
    #[error("init data signature mismatch")]
    BadSignature,
    #[error("init data has no valid auth_date")]
    MissingAuthDate,
    #[error("init data has expired")]
    Expired,
    #[error("init data has no valid user")]
    MissingUser,
}

/// Hex HMAC over the sorted `key=value` lines of all fields except `hash`,
/// keyed with `HMAC_SHA256("WebAppData", bot_token)`.
pub fn sign_fields(fields: &[(String, String)], bot_token: &str) -> Option<String> {
    let mut pairs: Vec<&(String, String)> = fields.iter().filter(|(k, _)| k != "hash").collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let data_check_string = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n");

    let mut secret = <HmacSha256 as Mac>::new_from_slice(b"WebAppData").ok()?;
    secret.update(bot_token.as_bytes());
    let secret_key = secret.finalize().into_bytes();

    let mut mac = <HmacSha256 as Mac>::new_from_slice(&secret_key).ok()?;
    mac.update(data_check_string.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a raw `initData` query string and extracts the user.
///
/// `now` is a unix timestamp; payloads older than `max_age_secs` are refused.
pub fn verify_init_data(
    init_data: &str,
    bot_token: &str,
    max_age_secs: i64,
    now: i64,
) -> Result<InitData, InitDataError> {
    let fields: Vec<(String, String)> = url::form_urlencoded::parse(init_data.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let hash = fields
        .iter()
        .find(|(k, _)| k == "hash")
        .map(|(_, v)| v.to_ascii_lowercase())
        .ok_or(InitDataError::MissingHash)?;

    let expected = sign_fields(&fields, bot_token).ok_or(InitDataError::BadSignature)?;
    if !bool::from(expected.as_bytes().ct_eq(hash.as_bytes())) {
        return Err(InitDataError::BadSignature);
    }

    let auth_date = fields
        .iter()
        .find(|(k, _)| k == "auth_date")
        .and_then(|(_, v)| v.parse::<i64>().ok())
        .ok_or(InitDataError::MissingAuthDate)?;
    if max_age_secs > 0 && now - auth_date > max_age_secs {
        return Err(InitDataError::Expired);
    }

    let user = fields
        .iter()
        .find(|(k, _)| k == "user")
        .and_then(|(_, v)| serde_json::from_str::<TelegramIdentity>(v).ok())
        .ok_or(InitDataError::MissingUser)?;

    Ok(InitData { user, auth_date })
}
