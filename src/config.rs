use std::collections::HashSet;
use std::env;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bot_token: Option<String>,
    /// Telegram users allowed to drive the bot. Empty means everyone.
    pub admin_ids: HashSet<i64>,
    pub log_level: String,
    pub telegram_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bot_token: None,
            admin_ids: HashSet::new(),
            log_level: "info".to_string(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let admin_ids = match var("ADMIN_IDS") {
            Some(raw) => parse_admin_ids(&raw)?,
            None => HashSet::new(),
        };

        Ok(Config {
            port,
            bot_token: var("BOT_TOKEN"),
            admin_ids,
            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),
            telegram_api_url: var("TELEGRAM_API_URL").unwrap_or(defaults.telegram_api_url),
        })
    }

    pub fn is_allowed(&self, user_id: i64) -> bool {
        self.admin_ids.is_empty() || self.admin_ids.contains(&user_id)
    }
}

fn parse_admin_ids(raw: &str) -> Result<HashSet<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<i64>()
                .map_err(|_| ConfigError::InvalidAdminId(item.to_string()))
        })
        .collect()
}
