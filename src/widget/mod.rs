// src/widget/mod.rs
//! Chat widget model.
//!
//! The widget is a reducer: [`reducer::update`] takes a [`WidgetContext`] and
//! a [`WidgetEvent`] and returns the [`Effect`]s to perform. A
//! [`runtime::WidgetRuntime`] owns one context, feeds it events and carries
//! out the effects (network calls, overlay timer, host-page autofill, view
//! updates). Every widget instance has its own context, so several can run
//! side by side.

pub mod autofill;
pub mod contact;
pub mod envelope;
pub mod reducer;
pub mod runtime;
pub mod transcript;
pub mod transport;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use autofill::{FormFiller, HostField, HostPage, HostPageFiller, NoopFiller};
pub use contact::ContactForm;
pub use reducer::{Effect, WidgetEvent, update};
pub use runtime::{WidgetHandle, WidgetRuntime, WidgetView};
pub use transcript::{Origin, RenderedEntry, Transcript};
pub use transport::{ChatTransport, HttpTransport, TransportError};

pub const DEFAULT_CONTAINER_ID: &str = "savbes-chat-widget";
pub const DEFAULT_OVERLAY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Bubble wired into one page; remembers a phone number typed in chat.
    Inline,
    /// Injected into a host container; contact overlay and host autofill.
    Injected,
}

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub variant: Variant,
    pub endpoint: String,
    pub container_id: String,
    pub overlay_delay: Duration,
}

impl WidgetConfig {
    pub fn inline(endpoint: impl Into<String>) -> Self {
        Self {
            variant: Variant::Inline,
            endpoint: endpoint.into(),
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            overlay_delay: DEFAULT_OVERLAY_DELAY,
        }
    }

    pub fn injected(endpoint: impl Into<String>) -> Self {
        Self { variant: Variant::Injected, ..Self::inline(endpoint) }
    }

    pub fn contact_overlay(&self) -> bool {
        self.variant == Variant::Injected
    }

    pub fn detects_phone(&self) -> bool {
        self.variant == Variant::Inline
    }

    pub fn needs_container(&self) -> bool {
        self.variant == Variant::Injected
    }
}

/// Contact details the visitor gave us, kept in memory only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactData {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Collapsed,
    Expanded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Hidden,
    /// Sentinel seen, waiting for the delay to elapse.
    Scheduled,
    Open,
}

/// Top-level widget state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Collapsed,
    Expanded,
    AwaitingReply,
}

#[derive(Debug, Clone)]
pub struct WidgetContext {
    pub config: WidgetConfig,
    pub session_id: String,
    pub transcript: Transcript,
    pub contact: ContactData,
    pub view: View,
    pub overlay: Overlay,
    /// Current content of the input field.
    pub input: String,
    pub in_flight: usize,
    next_request_id: u64,
}

impl WidgetContext {
    pub fn new(config: WidgetConfig) -> Self {
        Self::with_session(config, format!("session_{}", Uuid::new_v4().simple()))
    }

    pub fn with_session(config: WidgetConfig, session_id: impl Into<String>) -> Self {
        Self {
            config,
            session_id: session_id.into(),
            transcript: Transcript::new(),
            contact: ContactData::default(),
            view: View::Collapsed,
            overlay: Overlay::Hidden,
            input: String::new(),
            in_flight: 0,
            next_request_id: 1,
        }
    }

    pub fn state(&self) -> WidgetState {
        match (self.view, self.in_flight) {
            (View::Collapsed, _) => WidgetState::Collapsed,
            (View::Expanded, 0) => WidgetState::Expanded,
            (View::Expanded, _) => WidgetState::AwaitingReply,
        }
    }

    fn next_request_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }
}
