// src/widget/envelope.rs
//! Reply envelope returned by the chat API.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplyBody {
    Text(String),
    Object { text: String },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    response: ReplyBody,
}

/// Reply text from `{"response": "..."}` or `{"response": {"text": "..."}}`.
/// Anything else is `None`.
pub fn extract_reply(body: &str) -> Option<String> {
    let envelope: Envelope = serde_json::from_str(body).ok()?;
    Some(match envelope.response {
        ReplyBody::Text(text) | ReplyBody::Object { text } => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_shapes() {
        assert_eq!(extract_reply(r#"{"response":"Да","session_id":"s"}"#).as_deref(), Some("Да"));
        assert_eq!(extract_reply(r#"{"response":{"text":"Нет"}}"#).as_deref(), Some("Нет"));
    }

    #[test]
    fn other_shapes_rejected() {
        assert!(extract_reply(r#"{"reply":"x"}"#).is_none());
        assert!(extract_reply(r#"{"response":{"message":"x"}}"#).is_none());
        assert!(extract_reply(r#"{"response":42}"#).is_none());
        assert!(extract_reply("<html>502</html>").is_none());
    }
}
