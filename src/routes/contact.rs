// src/routes/contact.rs
use axum::{Json, extract::State};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::{
    error::AppError,
    message::{ContactRequest, ContactResponse},
    services::leads::Lead,
    state::SharedState,
};

const THANKS: &str =
    "Спасибо! Ваша заявка принята. Наш специалист свяжется с вами в ближайшее время.";

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn contact_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    let phone = payload.phone.trim();
    if phone.is_empty() {
        return Err(AppError::BadRequest("Номер телефона обязателен".to_string()));
    }

    let session_id = non_blank(payload.session_id);
    let (transcript, estimate) = match &session_id {
        Some(id) => (
            state.sessions.get_history(id).await.unwrap_or_default(),
            state.sessions.last_estimate(id).await,
        ),
        None => (Vec::new(), None),
    };

    let lead = Lead {
        received_at: Utc::now(),
        session_id,
        phone: phone.to_string(),
        name: non_blank(payload.name),
        email: non_blank(payload.email),
        transcript,
        estimate,
    };

    state
        .leads
        .append(&lead)
        .await
        .map_err(|e| AppError::Internal(format!("cannot store lead: {e}")))?;
    state.metrics.record_lead().await;
    info!(session_id = ?lead.session_id, has_estimate = lead.estimate.is_some(), "lead received");

    match &state.mailer {
        Some(mailer) => {
            if let Err(e) = mailer.send_lead(&lead).await {
                // the lead is already on disk
                error!(error = %e, "lead email not sent");
            }
        }
        None => warn!("email notifications disabled, lead only stored"),
    }

    Ok(Json(ContactResponse {
        success: true,
        message: THANKS.to_string(),
    }))
}
