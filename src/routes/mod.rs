// src/routes/mod.rs
pub mod admin;
pub mod chat;
pub mod contact;

use crate::state::SharedState;
use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub fn create_router(state: SharedState) -> Router {
    let admin_routes = Router::new()
        .route("/leads", get(admin::get_leads_handler))
        .route("/metrics", get(admin::get_metrics_handler))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/api/chat", post(chat::chat_handler))
        .route("/api/contact", post(contact::contact_handler))
        .nest("/admin", admin_routes)
        .route("/health", get(|| async { "OK" }))
        .fallback_service(ServeDir::new(&state.public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn auth_middleware(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.admin_key.as_deref() else {
        warn!("admin request rejected, ADMIN_KEY is not configured");
        return Err(StatusCode::UNAUTHORIZED);
    };
    match req.headers().get("x-admin-key") {
        Some(val) if val.as_bytes() == expected.as_bytes() => Ok(next.run(req).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Any origin when the list is empty, otherwise only the listed ones.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::very_permissive();
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring malformed origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
