// src/routes/admin.rs
use axum::{Json, extract::State};

use crate::services::metrics_manager::MetricsData;
use crate::state::SharedState;

pub async fn get_leads_handler(State(state): State<SharedState>) -> Json<Vec<serde_json::Value>> {
    Json(state.leads.read_all().await)
}

pub async fn get_metrics_handler(State(state): State<SharedState>) -> Json<MetricsData> {
    Json(state.metrics.get_metrics().await)
}
