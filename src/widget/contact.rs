// src/widget/contact.rs
//! Contact-form overlay.

use std::sync::LazyLock;

use regex::Regex;

use super::ContactData;

pub const REFUSAL_MESSAGE: &str = "Я не хочу оставлять контактные данные";

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+7|8)[\s\-()]*\d{3}[\s\-()]*\d{3}[\s\-]*\d{2}[\s\-]*\d{2}")
        .expect("valid phone regex")
});

/// Fields of the overlay form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl ContactForm {
    /// Trimmed contact data, or `None` without a phone.
    pub fn validate(&self) -> Option<ContactData> {
        let field = |value: &str| Some(value.trim().to_string()).filter(|v| !v.is_empty());
        let phone = field(&self.phone)?;
        Some(ContactData {
            name: field(&self.name),
            phone: Some(phone),
            email: field(&self.email),
        })
    }
}

/// User message reporting the contact back to the chat.
pub fn contact_message(contact: &ContactData) -> String {
    let mut parts = Vec::with_capacity(3);
    if let Some(phone) = &contact.phone {
        parts.push(format!("Телефон: {phone}"));
    }
    if let Some(name) = &contact.name {
        parts.push(format!("Имя: {name}"));
    }
    if let Some(email) = &contact.email {
        parts.push(format!("Email: {email}"));
    }
    format!("Мои контактные данные: {}", parts.join(", "))
}

/// First Russian phone number in `text`.
pub fn detect_phone(text: &str) -> Option<String> {
    PHONE.find(text).map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_is_required() {
        let form = ContactForm { name: "Анна".into(), phone: "   ".into(), email: String::new() };
        assert!(form.validate().is_none());
    }

    #[test]
    fn message_lists_given_fields() {
        let contact = ContactForm { phone: " 89096179763 ".into(), ..Default::default() }
            .validate()
            .unwrap();
        assert_eq!(contact_message(&contact), "Мои контактные данные: Телефон: 89096179763");
    }

    #[test]
    fn phone_detection() {
        assert_eq!(
            detect_phone("звоните +7 (909) 617-97-63").as_deref(),
            Some("+7 (909) 617-97-63")
        );
        assert_eq!(detect_phone("мой номер 89096179763, спасибо").as_deref(), Some("89096179763"));
        assert!(detect_phone("квартира 60 м2").is_none());
    }
}
