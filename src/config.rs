// src/config.rs
//! Runtime configuration read from the environment (and `.env` via dotenvy).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;
const DEFAULT_MODEL_NAME: &str = "yandexgpt";
const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set when email notifications are enabled")]
    MissingMailSetting(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmMode {
    Production,
    /// Canned keyword answers, no network.
    Test,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub catalog_id: Option<String>,
    pub model_name: String,
    pub mode: LlmMode,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub sender: String,
    pub password: String,
    pub recipient: String,
    pub smtp_server: String,
    pub smtp_port: u16,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub public_dir: PathBuf,
    pub session_ttl: Duration,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    /// Admin routes reject every request while unset.
    pub admin_key: Option<String>,
    pub leads_path: PathBuf,
    pub system_prompt_path: Option<PathBuf>,
    pub llm: LlmConfig,
    pub mail: Option<MailConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            public_dir: PathBuf::from("public"),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            allowed_origins: Vec::new(),
            admin_key: None,
            leads_path: PathBuf::from("leads.json"),
            system_prompt_path: None,
            llm: LlmConfig {
                api_key: None,
                catalog_id: None,
                model_name: DEFAULT_MODEL_NAME.to_string(),
                mode: LlmMode::Test,
            },
            mail: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parse_value(
            "BIND_ADDR",
            get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;
        let ttl_secs: u64 = match get("SESSION_TTL_SECS") {
            Some(raw) => parse_value("SESSION_TTL_SECS", raw)?,
            None => DEFAULT_SESSION_TTL_SECS,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty() && *origin != "*")
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let api_key = get("YANDEX_GPT_API_KEY")
            .map(|key| normalize_api_key(&key))
            .filter(|key| !key.is_empty());
        let mode = match get("YANDEX_GPT_MODE").as_deref() {
            Some("test") => LlmMode::Test,
            _ if api_key.is_none() => LlmMode::Test,
            _ => LlmMode::Production,
        };

        let mail_enabled =
            get("ENABLE_EMAIL_NOTIFICATIONS").is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let mail = if mail_enabled {
            let require = |key: &'static str| get(key).ok_or(ConfigError::MissingMailSetting(key));
            let smtp_port = match get("EMAIL_SMTP_PORT") {
                Some(raw) => parse_value("EMAIL_SMTP_PORT", raw)?,
                None => DEFAULT_SMTP_PORT,
            };
            Some(MailConfig {
                sender: require("EMAIL_SENDER")?,
                password: require("EMAIL_PASSWORD")?,
                recipient: require("EMAIL_RECIPIENT")?,
                smtp_server: require("EMAIL_SMTP_SERVER")?,
                smtp_port,
            })
        } else {
            None
        };

        Ok(Self {
            bind_addr,
            public_dir: get("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            session_ttl: Duration::from_secs(ttl_secs),
            allowed_origins,
            admin_key: get("ADMIN_KEY"),
            leads_path: get("LEADS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("leads.json")),
            system_prompt_path: get("SYSTEM_PROMPT_PATH").map(PathBuf::from),
            llm: LlmConfig {
                api_key,
                catalog_id: get("YANDEX_CATALOG_ID"),
                model_name: get("YANDEX_MODEL_NAME")
                    .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
                mode,
            },
            mail,
        })
    }
}

fn parse_value<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid { key, reason: e.to_string(), value: raw })
}

/// Keys pasted from consoles often carry quotes, spaces or line breaks.
pub fn normalize_api_key(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 3000)));
        assert_eq!(config.session_ttl, Duration::from_secs(1800));
        assert_eq!(config.llm.mode, LlmMode::Test);
        assert!(config.mail.is_none());
        assert!(config.admin_key.is_none());
    }

    #[test]
    fn origins_and_key_are_cleaned() {
        let config = config_from(&[
            ("ALLOWED_ORIGINS", "https://savbes.ru, https://www.savbes.ru ,"),
            ("YANDEX_GPT_API_KEY", " \"AQVN-abc_123\"\n"),
            ("YANDEX_GPT_MODE", "production"),
        ])
        .unwrap();
        assert_eq!(config.allowed_origins, vec!["https://savbes.ru", "https://www.savbes.ru"]);
        assert_eq!(config.llm.api_key.as_deref(), Some("AQVN-abc_123"));
        assert_eq!(config.llm.mode, LlmMode::Production);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = config_from(&[("SESSION_TTL_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SESSION_TTL_SECS", .. }));

        let err = config_from(&[("ENABLE_EMAIL_NOTIFICATIONS", "true")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingMailSetting("EMAIL_SENDER")));
    }
}
