// src/widget/transport.rs
use std::future::Future;

use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::message::{ChatRequest, ContactRequest};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

pub trait ChatTransport: Send + Sync + 'static {
    /// Send one chat message and return the raw response body.
    fn send(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;

    /// Hand the visitor's contact details to the lead endpoint.
    fn submit_contact(
        &self,
        request: ContactRequest,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// JSON POSTs to the chat API. No retries and no timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    contact_endpoint: Option<String>,
}

impl HttpTransport {
    /// The contact endpoint sits next to the chat one (`.../chat` → `.../contact`).
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let contact_endpoint = endpoint
            .trim_end_matches('/')
            .strip_suffix("/chat")
            .map(|base| format!("{base}/contact"));
        Self {
            client: Client::new(),
            endpoint,
            contact_endpoint,
        }
    }

    pub fn contact_endpoint(&self) -> Option<&str> {
        self.contact_endpoint.as_deref()
    }
}

impl ChatTransport for HttpTransport {
    async fn send(&self, request: ChatRequest) -> Result<String, TransportError> {
        debug!(endpoint = %self.endpoint, "posting chat message");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    async fn submit_contact(&self, request: ContactRequest) -> Result<(), TransportError> {
        let Some(endpoint) = &self.contact_endpoint else {
            return Err(TransportError::Other(format!(
                "no contact endpoint next to {}",
                self.endpoint
            )));
        };
        debug!(%endpoint, "posting contact details");
        self.client.post(endpoint).json(&request).send().await?.error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_endpoint_next_to_chat() {
        let transport = HttpTransport::new("https://savbes.ru/api/chat");
        assert_eq!(transport.contact_endpoint(), Some("https://savbes.ru/api/contact"));
        assert_eq!(HttpTransport::new("https://savbes.ru/bot").contact_endpoint(), None);
    }
}
