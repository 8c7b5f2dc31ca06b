// src/state.rs
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::leads::LeadStore;
use crate::services::llm::{DEFAULT_SYSTEM_PROMPT, LlmClient, LlmError};
use crate::services::mailer::Mailer;
use crate::services::metrics_manager::MetricsManager;
use crate::services::session_manager::SessionManager;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub sessions: SessionManager,
    pub metrics: MetricsManager,
    pub llm: LlmClient,
    /// `None` while email notifications are disabled.
    pub mailer: Option<Mailer>,
    pub leads: LeadStore,
    pub system_prompt: String,
    pub admin_key: Option<String>,
    pub public_dir: PathBuf,
}

impl AppState {
    /// Offline state with default paths.
    pub fn new(session_ttl: Duration) -> Self {
        let defaults = Config::default();
        Self {
            sessions: SessionManager::new(session_ttl),
            metrics: MetricsManager::new(),
            llm: LlmClient::Offline,
            mailer: None,
            leads: LeadStore::new(defaults.leads_path),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            admin_key: None,
            public_dir: defaults.public_dir,
        }
    }

    pub fn from_config(config: &Config, system_prompt: String) -> Result<Self, LlmError> {
        Ok(Self {
            sessions: SessionManager::new(config.session_ttl),
            metrics: MetricsManager::new(),
            llm: LlmClient::from_config(&config.llm)?,
            mailer: config.mail.clone().map(Mailer::new),
            leads: LeadStore::new(config.leads_path.clone()),
            system_prompt,
            admin_key: config.admin_key.clone(),
            public_dir: config.public_dir.clone(),
        })
    }
}
