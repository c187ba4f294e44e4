use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub telegram_bot_token: String,
    pub telegram_api_url: String,
    pub telegram_webhook_secret: Option<String>,
    pub webapp_url: Option<String>,
    pub init_data_max_age_secs: i64,
    pub super_admin_telegram_ids: Vec<i64>,
    pub uploads_dir: PathBuf,
    pub public_base_url: String,
    pub require_attachment: bool,
    pub max_attachments: usize,
    pub max_upload_bytes: usize,
    pub public_rps: u32,
    pub admin_rps: u32,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            telegram_bot_token: get_env("TELEGRAM_BOT_TOKEN")?,
            telegram_api_url: get_env_or("TELEGRAM_API_URL", "https://api.telegram.org")
                .trim_end_matches('/')
                .to_string(),
            telegram_webhook_secret: get_env_opt("TELEGRAM_WEBHOOK_SECRET"),
            webapp_url: get_env_opt("WEBAPP_URL"),
            init_data_max_age_secs: get_env_parse_or("INIT_DATA_MAX_AGE_SECS", 86_400)?,
            super_admin_telegram_ids: parse_id_list(
                "SUPER_ADMIN_TELEGRAM_IDS",
                &get_env_or("SUPER_ADMIN_TELEGRAM_IDS", ""),
            )?,
            uploads_dir: PathBuf::from(get_env_or("UPLOADS_DIR", "./uploads")),
            public_base_url: get_env_or("PUBLIC_BASE_URL", "http://localhost:8080")
                .trim_end_matches('/')
                .to_string(),
            require_attachment: get_env_parse_or("REQUIRE_ATTACHMENT", false)?,
            max_attachments: get_env_parse_or("MAX_ATTACHMENTS", 10)?,
            max_upload_bytes: get_env_parse_or("MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 50)?,
            admin_rps: get_env_parse_or("ADMIN_RPS", 20)?,
            log_format: match get_env_or("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Text,
            },
        })
    }

    pub fn is_super_admin(&self, telegram_id: i64) -> bool {
        self.super_admin_telegram_ids.contains(&telegram_id)
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

fn parse_id_list(name: &str, raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
        })
        .collect()
}
