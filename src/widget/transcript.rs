// src/widget/transcript.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Assistant,
}

impl Origin {
    /// Role class put on the rendered node.
    pub fn class(&self) -> &'static str {
        match self {
            Origin::User => "user",
            Origin::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub text: String,
    pub origin: Origin,
}

/// A rendered transcript node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub origin: Origin,
    pub text: String,
    /// Inner markup of the message node.
    pub html: String,
}

/// Append-only list of chat messages.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and render. Calling it twice appends twice.
    pub fn append(&mut self, text: impl Into<String>, origin: Origin) -> RenderedEntry {
        let entry = Entry { text: text.into(), origin };
        let rendered = render(&entry);
        self.entries.push(entry);
        rendered
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub fn count(&self, origin: Origin) -> usize {
        self.entries.iter().filter(|e| e.origin == origin).count()
    }
}

/// Visitor text is escaped; assistant replies come from our own API and may
/// carry markup.
pub fn render(entry: &Entry) -> RenderedEntry {
    let body = match entry.origin {
        Origin::User => escape_html(&entry.text),
        Origin::Assistant => entry.text.clone(),
    };
    RenderedEntry {
        origin: entry.origin,
        text: entry.text.clone(),
        html: body.replace('\n', "<br>"),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
