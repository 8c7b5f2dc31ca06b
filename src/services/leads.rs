// src/services/leads.rs
//! Contact requests, stored one JSON document per line.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs::{OpenOptions, read_to_string};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::calculator::Estimate;
use crate::services::session_manager::{Message, MessageRole};

#[derive(Debug, Clone, Serialize)]
pub struct Lead {
    pub received_at: DateTime<Utc>,
    pub session_id: Option<String>,
    pub phone: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub transcript: Vec<Message>,
    pub estimate: Option<Estimate>,
}

impl Lead {
    pub fn subject(&self) -> String {
        format!("Новая заявка с сайта САВБЕС - Номер телефона: {}", self.phone)
    }

    /// Plain-text summary sent to the office.
    pub fn summary(&self) -> String {
        let mut out = String::from("Новая заявка с сайта САВБЕС!\n\n");
        let _ = writeln!(out, "Номер телефона: {}", self.phone);
        if let Some(name) = &self.name {
            let _ = writeln!(out, "Имя: {name}");
        }
        if let Some(email) = &self.email {
            let _ = writeln!(out, "Email: {email}");
        }
        let _ = writeln!(out, "Время заявки: {}", self.received_at.format("%Y-%m-%d %H:%M:%S"));

        if let Some(estimate) = &self.estimate {
            let _ = write!(out, "\nРезультаты расчета:\n{}\n", estimate.render());
        }

        out.push_str("\nИстория диалога:\n");
        for message in &self.transcript {
            let role = match message.role {
                MessageRole::User => "Клиент",
                MessageRole::Bot => "Бот",
            };
            let sent_at = message.sent_at.format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(out, "{sent_at} {role}: {}", message.content);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct LeadStore {
    path: PathBuf,
}

impl LeadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn append(&self, lead: &Lead) -> std::io::Result<()> {
        let json = serde_json::to_string(lead)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(json.as_bytes()).await?;
        file.write_all(b"\n").await?;
        debug!(path = %self.path.display(), "lead stored");
        Ok(())
    }

    /// Every stored lead; unreadable lines are skipped.
    pub async fn read_all(&self) -> Vec<serde_json::Value> {
        let content = match read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "cannot read leads file");
                return Vec::new();
            }
        };
        content.lines().filter_map(|line| serde_json::from_str(line).ok()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead() -> Lead {
        Lead {
            received_at: Utc::now(),
            session_id: Some("s1".into()),
            phone: "+7 909 617-97-63".into(),
            name: Some("Иван".into()),
            email: None,
            transcript: vec![Message {
                role: MessageRole::User,
                content: "Нужен щит".into(),
                sent_at: Utc::now(),
            }],
            estimate: None,
        }
    }

    #[test]
    fn summary_lists_contact_and_dialog() {
        let summary = lead().summary();
        assert!(summary.contains("Номер телефона: +7 909 617-97-63"));
        assert!(summary.contains("Имя: Иван"));
        assert!(!summary.contains("Email:"));
        assert!(summary.contains("Клиент: Нужен щит"));
    }

    #[tokio::test]
    async fn append_then_read() {
        let path = std::env::temp_dir().join(format!("leads-{}.json", uuid::Uuid::new_v4()));
        let store = LeadStore::new(&path);
        assert!(store.read_all().await.is_empty());

        store.append(&lead()).await.unwrap();
        store.append(&lead()).await.unwrap();
        let leads = store.read_all().await;
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0]["phone"], "+7 909 617-97-63");

        let _ = tokio::fs::remove_file(&path).await;
    }
}
