use savbes_chat::calculator::{Answers, CalculatorDialog, CalculatorKind, Estimate};
use savbes_chat::services::session_manager::{MessageRole, SessionManager};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test]
async fn basic_session_flow() {
    let mgr = SessionManager::new(Duration::from_secs(60));
    let sid = mgr.create_session().await;
    assert!(!sid.is_empty());
    let len = mgr.append_message(&sid, MessageRole::User, "Здравствуйте").await;
    assert_eq!(len, 1);
    let history = mgr.get_history(&sid).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, MessageRole::User);
    assert!(mgr.remove_session(&sid).await);
    assert!(mgr.get_history(&sid).await.is_none());
}

#[tokio::test]
async fn client_ids_are_reused() {
    let mgr = SessionManager::new(Duration::from_secs(60));
    assert_eq!(mgr.ensure_session("session_abc").await, "session_abc");
    mgr.append_message("session_abc", MessageRole::User, "one").await;
    assert_eq!(mgr.ensure_session("session_abc").await, "session_abc");
    assert_eq!(mgr.get_history("session_abc").await.map(|h| h.len()), Some(1));
    assert_eq!(mgr.len().await, 1);
}

#[tokio::test]
async fn test_session_expiration() {
    let mgr = SessionManager::new(Duration::from_millis(10));
    let sid = mgr.create_session().await;

    // Wait for expiration
    sleep(Duration::from_millis(20)).await;

    let removed_count = mgr.purge_expired().await;
    assert_eq!(removed_count, 1, "Should have removed 1 expired session");
    assert!(!mgr.remove_session(&sid).await, "Session should already be gone");
}

#[tokio::test]
async fn test_dialog_and_estimate_persistence() {
    let mgr = SessionManager::new(Duration::from_secs(60));
    let sid = mgr.create_session().await;

    assert!(!mgr.has_dialog(&sid).await);
    let turn = CalculatorDialog::start(CalculatorKind::Socket, Answers::new());
    mgr.set_dialog(&sid, turn.dialog).await;
    assert!(mgr.has_dialog(&sid).await);

    // taking the dialog leaves the session without one
    let dialog = mgr.take_dialog(&sid).await.unwrap();
    assert_eq!(dialog.kind(), CalculatorKind::Socket);
    assert!(!mgr.has_dialog(&sid).await);

    let estimate = Estimate::new(CalculatorKind::Socket, "Розетки").with_total(2400.0);
    mgr.set_last_estimate(&sid, estimate.clone()).await;
    assert_eq!(mgr.last_estimate(&sid).await, Some(estimate));
}
