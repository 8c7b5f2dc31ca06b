// src/widget/autofill.rs
//! Best-effort filling of the host page's own contact forms.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info};

use super::ContactData;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AutofillError {
    #[error("no matching input fields on the page")]
    NoMatchingFields,

    #[error("field {0} is disabled")]
    Disabled(String),
}

pub trait FormFiller: Send {
    /// Fill what can be filled. Returns the number of fields set.
    fn fill(&mut self, contact: &ContactData) -> Result<usize, AutofillError>;
}

/// Filler for hosts where autofill is off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFiller;

impl FormFiller for NoopFiller {
    fn fill(&mut self, _contact: &ContactData) -> Result<usize, AutofillError> {
        Ok(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticEvent {
    Input,
    Change,
}

/// An `<input>` element on the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostField {
    pub id: String,
    pub input_type: String,
    pub name: String,
    pub placeholder: String,
    pub value: String,
    pub disabled: bool,
    /// Ids of enclosing elements, innermost first.
    pub ancestors: Vec<String>,
    /// Events fired at the field by the filler.
    pub events: Vec<SyntheticEvent>,
}

impl HostField {
    pub fn new(id: &str, input_type: &str, name: &str, placeholder: &str) -> Self {
        Self {
            id: id.to_string(),
            input_type: input_type.to_string(),
            name: name.to_string(),
            placeholder: placeholder.to_string(),
            ..Self::default()
        }
    }

    pub fn inside(mut self, ancestor: &str) -> Self {
        self.ancestors.push(ancestor.to_string());
        self
    }

    fn matches(&self, hints: &[&str]) -> bool {
        let name = self.name.to_lowercase();
        let placeholder = self.placeholder.to_lowercase();
        hints.iter().any(|hint| name.contains(hint) || placeholder.contains(hint))
    }

    fn kind(&self) -> Option<FieldKind> {
        let input_type = self.input_type.to_lowercase();
        if input_type == "tel" || self.matches(&["phone", "tel", "телефон"]) {
            Some(FieldKind::Phone)
        } else if input_type == "email" || self.matches(&["email", "mail", "почт"]) {
            Some(FieldKind::Email)
        } else if matches!(input_type.as_str(), "" | "text")
            && self.matches(&["name", "имя", "фио"])
        {
            Some(FieldKind::Name)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Phone,
    Name,
    Email,
}

/// Elements and input fields of the page hosting the widget.
#[derive(Debug, Clone, Default)]
pub struct HostPage {
    pub element_ids: HashSet<String>,
    pub fields: Vec<HostField>,
}

impl HostPage {
    pub fn with_element(mut self, id: &str) -> Self {
        self.element_ids.insert(id.to_string());
        self
    }

    pub fn with_field(mut self, field: HostField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.element_ids.contains(id)
    }

    pub fn field(&self, id: &str) -> Option<&HostField> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// Heuristic filler over a [`HostPage`], leaving the widget's own inputs alone.
#[derive(Debug, Clone)]
pub struct HostPageFiller {
    page: HostPage,
    widget_root: String,
}

impl HostPageFiller {
    pub fn new(page: HostPage, widget_root: impl Into<String>) -> Self {
        Self { page, widget_root: widget_root.into() }
    }

    pub fn page(&self) -> &HostPage {
        &self.page
    }
}

impl FormFiller for HostPageFiller {
    fn fill(&mut self, contact: &ContactData) -> Result<usize, AutofillError> {
        let mut filled = 0;
        let mut kept = 0;
        let mut disabled = None;

        for field in &mut self.page.fields {
            let in_widget = field.id == self.widget_root
                || field.ancestors.iter().any(|a| *a == self.widget_root);
            if in_widget {
                continue;
            }
            let value = match field.kind() {
                Some(FieldKind::Phone) => contact.phone.as_deref(),
                Some(FieldKind::Name) => contact.name.as_deref(),
                Some(FieldKind::Email) => contact.email.as_deref(),
                None => None,
            };
            let Some(value) = value else { continue };
            // never overwrite what the visitor already typed
            if !field.value.is_empty() {
                kept += 1;
                continue;
            }
            if field.disabled {
                disabled.get_or_insert_with(|| field.id.clone());
                continue;
            }
            debug!(field = %field.id, "autofilling host field");
            field.value = value.to_string();
            field.events.extend([SyntheticEvent::Input, SyntheticEvent::Change]);
            filled += 1;
        }

        match (filled, disabled) {
            (0, _) if kept > 0 => {
                debug!(kept, "host form fields already filled");
                Ok(0)
            }
            (0, Some(id)) => Err(AutofillError::Disabled(id)),
            (0, None) => Err(AutofillError::NoMatchingFields),
            (n, _) => {
                info!(filled = n, "host form fields filled");
                Ok(n)
            }
        }
    }
}
