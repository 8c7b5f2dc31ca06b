use savbes_chat::message::{CONTACT_FORM_SENTINEL, ChatResponse, ContactResponse};
use savbes_chat::routes::create_router;
use savbes_chat::services::leads::LeadStore;
use savbes_chat::state::AppState;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

fn temp_leads(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("savbes-{}-{}.jsonl", name, uuid::Uuid::new_v4()));
    let _ = std::fs::remove_file(&path);
    path
}

fn app_with(state: AppState) -> Router {
    create_router(Arc::new(state))
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn chat(app: &Router, message: &str, session_id: Option<&str>) -> ChatResponse {
    let body = serde_json::json!({ "message": message, "session_id": session_id }).to_string();
    let response = app.clone().oneshot(post_json("/api/chat", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_chat_endpoint() {
    let app = app_with(AppState::new(Duration::from_secs(60)));

    let resp = chat(&app, "Привет", None).await;
    assert!(resp.response.starts_with("Здравствуйте"));
    assert!(!resp.session_id.is_empty());
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let app = app_with(AppState::new(Duration::from_secs(60)));

    let response = app
        .oneshot(post_json("/api/chat", r#"{"message": "   ", "session_id": null}"#.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["error"], "Сообщение не может быть пустым");
}

#[tokio::test]
async fn test_session_id_is_kept() {
    let app = app_with(AppState::new(Duration::from_secs(60)));

    let first = chat(&app, "Привет", Some("session_from_widget")).await;
    assert_eq!(first.session_id, "session_from_widget");
    let second = chat(&app, "Расскажите о компании", Some(&first.session_id)).await;
    assert_eq!(second.session_id, "session_from_widget");
}

#[tokio::test]
async fn test_calculator_flow_and_lead() {
    let leads_path = temp_leads("flow");
    let mut state = AppState::new(Duration::from_secs(60));
    state.leads = LeadStore::new(&leads_path);
    state.admin_key = Some("secret".to_string());
    let app = app_with(state);

    // property and walls come from the question itself
    let question = "Сколько стоит установить розетки в квартире 60 м2, стены кирпич";
    let resp = chat(&app, question, None).await;
    assert!(resp.response.contains("одинарных розеток"), "got: {}", resp.response);
    let session_id = resp.session_id;

    let mut last = String::new();
    for answer in ["10", "0", "0", "2", "0", "0", "2"] {
        last = chat(&app, answer, Some(&session_id)).await.response;
    }
    assert!(last.contains("Общая стоимость"), "got: {last}");
    assert!(last.ends_with(CONTACT_FORM_SENTINEL));
    assert!(last.contains("Кирпич"));

    let contact = serde_json::json!({
        "phone": "+7 909 617-97-63",
        "name": "Иван",
        "session_id": session_id,
    })
    .to_string();
    let response = app.clone().oneshot(post_json("/api/contact", contact)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let resp: ContactResponse = serde_json::from_slice(&body_bytes).unwrap();
    assert!(resp.success);

    let req = Request::builder()
        .uri("/admin/leads")
        .header("x-admin-key", "secret")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let leads: Vec<serde_json::Value> = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["phone"], "+7 909 617-97-63");
    assert!(leads[0]["estimate"].is_object());
    assert_eq!(leads[0]["transcript"].as_array().map(Vec::len), Some(16));

    let _ = std::fs::remove_file(&leads_path);
}

#[tokio::test]
async fn test_contact_requires_phone() {
    let leads_path = temp_leads("nophone");
    let mut state = AppState::new(Duration::from_secs(60));
    state.leads = LeadStore::new(&leads_path);
    let app = app_with(state);

    let response = app
        .oneshot(post_json("/api/contact", r#"{"phone": " ", "name": "Иван"}"#.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!leads_path.exists());
}

#[tokio::test]
async fn test_admin_requires_key() {
    let app = app_with(AppState::new(Duration::from_secs(60)));
    let req = Request::builder().uri("/admin/metrics").body(Body::empty()).unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut state = AppState::new(Duration::from_secs(60));
    state.admin_key = Some("secret".to_string());
    let app = app_with(state);

    let req = Request::builder()
        .uri("/admin/metrics")
        .header("x-admin-key", "wrong")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    chat(&app, "Привет", None).await;
    let req = Request::builder()
        .uri("/admin/metrics")
        .header("x-admin-key", "secret")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let metrics: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(metrics["route_usage"]["llm"], 1);
}

#[tokio::test]
async fn test_health() {
    let app = app_with(AppState::new(Duration::from_secs(60)));
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body_bytes[..], b"OK");
}
