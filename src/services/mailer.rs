// src/services/mailer.rs
//! Lead notifications over SMTP, delivered by the system `curl`.

use std::process::Stdio;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::info;

use crate::config::MailConfig;
use crate::services::leads::Lead;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("cannot run curl: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("smtp delivery failed ({status}): {stderr}")]
    Delivery { status: String, stderr: String },
}

#[derive(Debug, Clone)]
pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Implicit TLS on 465, STARTTLS everywhere else.
    pub fn smtp_url(&self) -> String {
        let scheme = if self.config.smtp_port == 465 { "smtps" } else { "smtp" };
        format!("{scheme}://{}:{}", self.config.smtp_server, self.config.smtp_port)
    }

    pub fn compose(&self, subject: &str, body: &str) -> String {
        format!(
            "From: {from}\r\nTo: {to}\r\nSubject: {subject}\r\nMIME-Version: 1.0\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             Content-Transfer-Encoding: 8bit\r\n\r\n{body}",
            from = self.config.sender,
            to = self.config.recipient,
            subject = encode_header(subject),
            body = body.replace('\n', "\r\n"),
        )
    }

    pub async fn send_lead(&self, lead: &Lead) -> Result<(), MailError> {
        self.send(&lead.subject(), &lead.summary()).await
    }

    pub async fn send(&self, subject: &str, body: &str) -> Result<(), MailError> {
        let message = self.compose(subject, body);
        let url = self.smtp_url();
        info!(%url, recipient = %self.config.recipient, "sending email");

        let mut child = Command::new("curl")
            .args(["--silent", "--show-error", "--ssl-reqd", "--url", &url])
            .args(["--user", &format!("{}:{}", self.config.sender, self.config.password)])
            .args(["--mail-from", &self.config.sender, "--mail-rcpt", &self.config.recipient])
            .args(["-T", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.as_bytes()).await?;
        }
        let output = child.wait_with_output().await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(MailError::Delivery {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// RFC 2047 encoded-word for non-ASCII header values.
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer(port: u16) -> Mailer {
        Mailer::new(MailConfig {
            sender: "bot@savbes.ru".into(),
            password: "secret".into(),
            recipient: "office@savbes.ru".into(),
            smtp_server: "smtp.example.com".into(),
            smtp_port: port,
        })
    }

    #[test]
    fn url_scheme_follows_port() {
        assert_eq!(mailer(465).smtp_url(), "smtps://smtp.example.com:465");
        assert_eq!(mailer(587).smtp_url(), "smtp://smtp.example.com:587");
    }

    #[test]
    fn compose_encodes_subject() {
        let message = mailer(587).compose("Заявка", "строка 1\nстрока 2");
        assert!(message.contains("Subject: =?UTF-8?B?"));
        assert!(message.contains("To: office@savbes.ru\r\n"));
        assert!(message.ends_with("строка 1\r\nстрока 2"));
    }
}
