// src/widget/reducer.rs
use std::time::Duration;

use tracing::{debug, warn};

use super::contact::{self, ContactForm, REFUSAL_MESSAGE};
use super::envelope::extract_reply;
use super::transcript::{Origin, RenderedEntry};
use super::transport::TransportError;
use super::{ContactData, Overlay, View, WidgetContext};
use crate::message::{CONTACT_FORM_SENTINEL, ChatRequest, ContactRequest};

pub const APOLOGY: &str =
    "Извините, произошла ошибка при отправке сообщения. Пожалуйста, попробуйте позже.";

#[derive(Debug)]
pub enum WidgetEvent {
    /// Bubble clicked.
    Toggle,
    /// Input field edited.
    Input(String),
    /// Send button or Enter.
    Submit,
    Reply {
        request_id: u64,
        outcome: Result<String, TransportError>,
    },
    /// Overlay delay elapsed.
    OverlayDue,
    ContactSubmitted(ContactForm),
    ContactCancelled,
    /// Lead endpoint answered.
    ContactDelivered(Result<(), TransportError>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SetExpanded(bool),
    Render(RenderedEntry),
    ScrollToLatest,
    ClearInput,
    Post { request_id: u64, request: ChatRequest },
    ScheduleOverlay(Duration),
    OpenOverlay,
    CloseOverlay,
    /// Overlay submitted without a phone.
    ContactRejected,
    Autofill(ContactData),
    ReportContact(ContactRequest),
}

pub fn update(ctx: &mut WidgetContext, event: WidgetEvent) -> Vec<Effect> {
    match event {
        WidgetEvent::Toggle => {
            ctx.view = match ctx.view {
                View::Collapsed => View::Expanded,
                View::Expanded => View::Collapsed,
            };
            vec![Effect::SetExpanded(ctx.view == View::Expanded)]
        }
        WidgetEvent::Input(text) => {
            ctx.input = text;
            Vec::new()
        }
        WidgetEvent::Submit => {
            if ctx.view == View::Collapsed {
                return Vec::new();
            }
            let text = std::mem::take(&mut ctx.input);
            let mut effects = dispatch(ctx, &text);
            if effects.is_empty() {
                // nothing sent, keep what the visitor typed
                ctx.input = text;
            } else {
                effects.insert(1, Effect::ClearInput);
            }
            effects
        }
        WidgetEvent::Reply { request_id, outcome } => {
            ctx.in_flight = ctx.in_flight.saturating_sub(1);
            let text = match outcome {
                Ok(body) => extract_reply(&body).unwrap_or_else(|| {
                    warn!(request_id, "unexpected reply shape");
                    APOLOGY.to_string()
                }),
                Err(e) => {
                    warn!(request_id, error = %e, "chat request failed");
                    APOLOGY.to_string()
                }
            };
            receive(ctx, text)
        }
        WidgetEvent::OverlayDue => {
            if ctx.overlay != Overlay::Scheduled {
                return Vec::new();
            }
            ctx.overlay = Overlay::Open;
            vec![Effect::OpenOverlay]
        }
        WidgetEvent::ContactSubmitted(form) => {
            if ctx.overlay != Overlay::Open {
                return Vec::new();
            }
            let Some(contact) = form.validate() else {
                return vec![Effect::ContactRejected];
            };
            ctx.overlay = Overlay::Hidden;
            ctx.contact = contact.clone();
            let message = contact::contact_message(&contact);
            let report = ContactRequest {
                phone: contact.phone.clone().unwrap_or_default(),
                name: contact.name.clone(),
                email: contact.email.clone(),
                session_id: Some(ctx.session_id.clone()),
            };
            let mut effects = vec![
                Effect::CloseOverlay,
                Effect::Autofill(contact),
                Effect::ReportContact(report),
            ];
            effects.extend(dispatch(ctx, &message));
            effects
        }
        WidgetEvent::ContactCancelled => {
            if ctx.overlay != Overlay::Open {
                return Vec::new();
            }
            ctx.overlay = Overlay::Hidden;
            let mut effects = vec![Effect::CloseOverlay];
            effects.extend(dispatch(ctx, REFUSAL_MESSAGE));
            effects
        }
        WidgetEvent::ContactDelivered(outcome) => {
            if let Err(e) = outcome {
                warn!(error = %e, "contact details not delivered");
            }
            Vec::new()
        }
    }
}

/// Append a user message and post it. Blank text does nothing.
fn dispatch(ctx: &mut WidgetContext, text: &str) -> Vec<Effect> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if ctx.config.detects_phone() {
        if let Some(phone) = contact::detect_phone(text) {
            debug!(%phone, "phone number noticed in chat");
            ctx.contact.phone = Some(phone);
        }
    }

    let rendered = ctx.transcript.append(text, Origin::User);
    let request_id = ctx.next_request_id();
    ctx.in_flight += 1;
    vec![
        Effect::Render(rendered),
        Effect::ScrollToLatest,
        Effect::Post {
            request_id,
            request: ChatRequest {
                message: text.to_string(),
                session_id: Some(ctx.session_id.clone()),
            },
        },
    ]
}

fn receive(ctx: &mut WidgetContext, text: String) -> Vec<Effect> {
    let mut effects = Vec::new();
    let text = if text.contains(CONTACT_FORM_SENTINEL) {
        if ctx.config.contact_overlay() && ctx.overlay == Overlay::Hidden {
            ctx.overlay = Overlay::Scheduled;
            effects.push(Effect::ScheduleOverlay(ctx.config.overlay_delay));
        }
        text.replace(CONTACT_FORM_SENTINEL, "").trim().to_string()
    } else {
        text
    };

    if !text.is_empty() {
        let rendered = ctx.transcript.append(text, Origin::Assistant);
        effects.splice(0..0, [Effect::Render(rendered), Effect::ScrollToLatest]);
    }
    effects
}
