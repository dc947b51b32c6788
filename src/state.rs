use std::sync::Arc;

use crate::config::Config;
use crate::services::session_store::SessionStore;
use crate::services::telegram::TelegramBot;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    /// `None` when no bot token is configured.
    pub telegram: Option<Arc<TelegramBot>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let telegram = config
            .bot_token
            .as_deref()
            .map(|token| Arc::new(TelegramBot::new(token, &config.telegram_api_url)));

        Self {
            sessions: Arc::new(SessionStore::new()),
            telegram,
            config: Arc::new(config),
        }
    }
}
