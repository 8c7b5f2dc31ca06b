// src/services/session_manager.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::calculator::{CalculatorDialog, Estimate};

/// Messages kept per session; older ones are dropped first.
pub const MAX_HISTORY: usize = 50;

#[derive(Clone, Debug, Serialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Bot,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
    pub last_active: Instant,
    /// Calculator dialog in progress, if any.
    pub dialog: Option<CalculatorDialog>,
    /// Most recent finished estimate, attached to the lead on contact.
    pub last_estimate: Option<Estimate>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            last_active: Instant::now(),
            dialog: None,
            last_estimate: None,
        }
    }
}

#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").field("ttl", &self.ttl).finish()
    }
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Create a fresh session and return its id.
    pub async fn create_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let mut guard = self.inner.write().await;
        guard.insert(id.clone(), Session::new(id.clone()));
        id
    }

    /// Make sure a session with this id exists; ids come from the client.
    pub async fn ensure_session(&self, id: &str) -> String {
        {
            let guard = self.inner.read().await;
            if guard.contains_key(id) {
                return id.to_string();
            }
        }
        let mut guard = self.inner.write().await;
        guard.entry(id.to_string()).or_insert_with(|| Session::new(id));
        id.to_string()
    }

    /// Append to the history, trimming it to [`MAX_HISTORY`]. Returns the new length.
    pub async fn append_message(
        &self,
        session_id: &str,
        role: MessageRole,
        content: impl Into<String>,
    ) -> usize {
        let mut guard = self.inner.write().await;
        let entry = guard.entry(session_id.to_string()).or_insert_with(|| Session::new(session_id));
        entry.messages.push(Message {
            role,
            content: content.into(),
            sent_at: Utc::now(),
        });
        if entry.messages.len() > MAX_HISTORY {
            let excess = entry.messages.len() - MAX_HISTORY;
            entry.messages.drain(..excess);
        }
        entry.last_active = Instant::now();
        entry.messages.len()
    }

    pub async fn get_history(&self, session_id: &str) -> Option<Vec<Message>> {
        let guard = self.inner.read().await;
        guard.get(session_id).map(|s| s.messages.clone())
    }

    /// Remove the active dialog so the caller can advance it.
    pub async fn take_dialog(&self, session_id: &str) -> Option<CalculatorDialog> {
        let mut guard = self.inner.write().await;
        guard.get_mut(session_id).and_then(|s| s.dialog.take())
    }

    pub async fn set_dialog(&self, session_id: &str, dialog: Option<CalculatorDialog>) {
        let mut guard = self.inner.write().await;
        if let Some(session) = guard.get_mut(session_id) {
            session.dialog = dialog;
        }
    }

    pub async fn has_dialog(&self, session_id: &str) -> bool {
        let guard = self.inner.read().await;
        guard.get(session_id).is_some_and(|s| s.dialog.is_some())
    }

    pub async fn set_last_estimate(&self, session_id: &str, estimate: Estimate) {
        let mut guard = self.inner.write().await;
        if let Some(session) = guard.get_mut(session_id) {
            session.last_estimate = Some(estimate);
        }
    }

    pub async fn last_estimate(&self, session_id: &str) -> Option<Estimate> {
        let guard = self.inner.read().await;
        guard.get(session_id).and_then(|s| s.last_estimate.clone())
    }

    pub async fn remove_session(&self, session_id: &str) -> bool {
        let mut guard = self.inner.write().await;
        guard.remove(session_id).is_some()
    }

    /// Remove sessions idle longer than ttl. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let before = guard.len();
        guard.retain(|_, s| now.duration_since(s.last_active) < self.ttl);
        before - guard.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn list_session_ids(&self) -> Vec<String> {
        let guard = self.inner.read().await;
        guard.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn history_is_capped() {
        let mgr = SessionManager::new(Duration::from_secs(60));
        let sid = mgr.create_session().await;
        for i in 0..(MAX_HISTORY + 5) {
            mgr.append_message(&sid, MessageRole::User, format!("msg {i}")).await;
        }
        let history = mgr.get_history(&sid).await.unwrap();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0].content, "msg 5");
    }
}
