// src/services/llm.rs
//! Completion provider: Yandex GPT, or an offline keyword responder when no
//! API key is configured.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{LlmConfig, LlmMode};
use crate::message::CONTACT_FORM_SENTINEL;
use crate::services::session_manager::{Message, MessageRole};

const COMPLETION_URL: &str = "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 2000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_SYSTEM_PROMPT: &str = "Ты виртуальный помощник компании САВБЕС, \
которая выполняет электромонтажные работы в Оренбурге. Отвечай кратко и вежливо на русском языке. \
Если клиент хочет узнать стоимость работ, добавь в ответ одну из команд: \
ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_ОСВЕЩЕНИЕ, ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_ЩИТЫ, ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_РОЗЕТКИ, \
ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_КАБЕЛЬ или ЗАПУСТИТЬ_КАЛЬКУЛЯТОР. \
Если клиент хочет связаться с компанией, добавь в ответ [SHOW_CONTACT_FORM].";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("catalog id is not configured")]
    MissingCatalog,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("api returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion has no alternatives")]
    EmptyResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest<'a> {
    model_uri: String,
    completion_options: CompletionOptions,
    messages: Vec<CompletionMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    result: CompletionResult,
}

#[derive(Debug, Deserialize)]
struct CompletionResult {
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    message: AlternativeMessage,
}

#[derive(Debug, Deserialize)]
struct AlternativeMessage {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Clone)]
pub struct YandexGpt {
    client: Client,
    api_key: String,
    model_uri: String,
}

impl YandexGpt {
    pub fn new(api_key: String, catalog_id: &str, model_name: &str) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            model_uri: format!("gpt://{catalog_id}/{model_name}"),
        })
    }

    /// `history` ends with the visitor's latest message.
    pub async fn complete(
        &self,
        system_prompt: &str,
        history: &[Message],
    ) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if !system_prompt.is_empty() {
            messages.push(CompletionMessage { role: "system", text: system_prompt });
        }
        messages.extend(history.iter().map(|m| CompletionMessage {
            role: match m.role {
                MessageRole::User => "user",
                MessageRole::Bot => "assistant",
            },
            text: &m.content,
        }));

        let request = CompletionRequest {
            model_uri: self.model_uri.clone(),
            completion_options: CompletionOptions {
                stream: false,
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            },
            messages,
        };
        debug!(
            model_uri = %self.model_uri,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(COMPLETION_URL)
            .header("Authorization", format!("Api-Key {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: String =
                response.text().await.unwrap_or_default().chars().take(500).collect();
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let body: CompletionResponse = response.json().await?;
        body.result
            .alternatives
            .into_iter()
            .next()
            .map(|alt| alt.message.text)
            .ok_or(LlmError::EmptyResult)
    }
}

#[derive(Debug, Clone)]
pub enum LlmClient {
    Yandex(YandexGpt),
    Offline,
}

impl LlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        match (config.mode, config.api_key.as_deref()) {
            (LlmMode::Production, Some(key)) => {
                let catalog = config.catalog_id.as_deref().ok_or(LlmError::MissingCatalog)?;
                info!(model = %config.model_name, "using Yandex GPT");
                Ok(LlmClient::Yandex(YandexGpt::new(key.to_string(), catalog, &config.model_name)?))
            }
            _ => {
                warn!("no Yandex GPT key or test mode requested, using offline responder");
                Ok(LlmClient::Offline)
            }
        }
    }

    pub async fn complete(
        &self,
        system_prompt: &str,
        history: &[Message],
    ) -> Result<String, LlmError> {
        match self {
            LlmClient::Yandex(client) => client.complete(system_prompt, history).await,
            LlmClient::Offline => {
                let last = history
                    .iter()
                    .rev()
                    .find(|m| m.role == MessageRole::User)
                    .map(|m| m.content.as_str())
                    .unwrap_or_default();
                Ok(offline_reply(last))
            }
        }
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Canned answers shaped like the hosted model's, launch commands included.
pub fn offline_reply(user_message: &str) -> String {
    let lower = user_message.to_lowercase();

    if contains_any(&lower, &["свет", "освещение", "светильник", "люстр"]) {
        "Я могу помочь вам рассчитать стоимость монтажа освещения. \
         ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_ОСВЕЩЕНИЕ"
            .to_string()
    } else if contains_any(&lower, &["щит", "автомат", "узо"]) {
        "Давайте рассчитаем стоимость сборки и монтажа электрощита. \
         ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_ЩИТЫ"
            .to_string()
    } else if contains_any(&lower, &["розетк", "выключател", "проходной"]) {
        "Я помогу рассчитать стоимость установки розеток и выключателей. \
         ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_РОЗЕТКИ"
            .to_string()
    } else if contains_any(&lower, &["кабел", "провод", "линия"]) {
        "Давайте рассчитаем стоимость кабельных работ. ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_КАБЕЛЬ".to_string()
    } else if contains_any(&lower, &["стоимость", "цена", "расчет", "посчитать"]) {
        "Я могу помочь рассчитать стоимость электромонтажных работ. \
         ЗАПУСТИТЬ_КАЛЬКУЛЯТОР"
            .to_string()
    } else if contains_any(&lower, &["контакт", "телефон", "связаться"]) {
        format!(
            "Для связи с нами, пожалуйста, оставьте свои контактные данные. {CONTACT_FORM_SENTINEL}"
        )
    } else if contains_any(&lower, &["привет", "здравствуй", "добрый"]) {
        "Здравствуйте! Я виртуальный помощник компании САВБЕС. \
         Мы предоставляем услуги электромонтажа в Оренбурге. Чем могу помочь?"
            .to_string()
    } else {
        "Я виртуальный помощник компании САВБЕС. \
         Мы предоставляем услуги электромонтажа в Оренбурге. \
         Могу рассказать о наших услугах или помочь рассчитать стоимость работ."
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_reply_carries_commands() {
        assert!(offline_reply("Нужны светильники").ends_with("ЗАПУСТИТЬ_КАЛЬКУЛЯТОР_ОСВЕЩЕНИЕ"));
        assert!(offline_reply("Как с вами связаться?").contains(CONTACT_FORM_SENTINEL));
        assert!(offline_reply("Привет").starts_with("Здравствуйте"));
    }

    #[test]
    fn offline_without_key() {
        let config = LlmConfig {
            api_key: None,
            catalog_id: None,
            model_name: "yandexgpt".into(),
            mode: LlmMode::Production,
        };
        assert!(matches!(LlmClient::from_config(&config), Ok(LlmClient::Offline)));
    }
}
