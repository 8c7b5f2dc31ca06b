use savbes_chat::calculator::CalculatorKind;
use savbes_chat::calculator::dialog::CANCELLED_REPLY;
use savbes_chat::message::CONTACT_FORM_SENTINEL;
use savbes_chat::services::chatbot::{CalculationIntent, detect_calculation_intent, generate_reply};
use savbes_chat::services::session_manager::MessageRole;
use savbes_chat::state::AppState;
use std::time::Duration;

async fn say(state: &AppState, session_id: &str, message: &str) -> String {
    state.sessions.append_message(session_id, MessageRole::User, message).await;
    let reply = generate_reply(state, session_id, message).await;
    state.sessions.append_message(session_id, MessageRole::Bot, &reply).await;
    reply
}

#[test]
fn test_detect_calculation_intent() {
    assert_eq!(
        detect_calculation_intent("Сколько стоит поменять проводку?"),
        Some(CalculationIntent::Price)
    );
    assert_eq!(detect_calculation_intent("Нужен расчет"), Some(CalculationIntent::Price));
    assert_eq!(
        detect_calculation_intent("Мне надо несколько работ сделать"),
        Some(CalculationIntent::MultiService)
    );
    assert_eq!(
        detect_calculation_intent("Нужен щит в гараж"),
        Some(CalculationIntent::SpecificNeed)
    );
    assert_eq!(detect_calculation_intent("Добрый день"), None);
    // a question about the service list is not a price request
    assert_eq!(detect_calculation_intent("Какие услуги и сколько стоит?"), None);
}

#[tokio::test]
async fn test_specific_need_runs_calculator() {
    let state = AppState::new(Duration::from_secs(60));
    let sid = state.sessions.create_session().await;

    // house and concrete are picked up from the request
    let reply = say(&state, &sid, "Нужен щит в частный дом, стены бетон").await;
    assert!(reply.contains("тип электрощита"), "got: {reply}");
    assert!(state.sessions.has_dialog(&sid).await);

    let reply = say(&state, &sid, "много").await;
    assert!(reply.starts_with("Не удалось распознать ответ"));

    let mut reply = String::new();
    for answer in ["2", "12", "1", "0", "да", "0", "2"] {
        reply = say(&state, &sid, answer).await;
    }
    assert!(reply.contains("Общая стоимость"), "got: {reply}");
    assert!(reply.ends_with(CONTACT_FORM_SENTINEL));
    assert!(!state.sessions.has_dialog(&sid).await);

    let estimate = state.sessions.last_estimate(&sid).await.unwrap();
    assert_eq!(estimate.kind, CalculatorKind::Panel);
    assert!(estimate.total >= 5000);

    let metrics = state.metrics.get_metrics().await;
    assert_eq!(metrics.calculator_usage.get("panel"), Some(&1));
    assert_eq!(metrics.estimates_completed, 1);
    assert_eq!(metrics.route_usage.get("calculation_intent"), Some(&1));
}

#[tokio::test]
async fn test_launch_command_and_cancel() {
    let state = AppState::new(Duration::from_secs(60));
    let sid = state.sessions.create_session().await;

    let reply = say(&state, &sid, "Хочу светильники в гостиную").await;
    assert!(reply.starts_with("Выберите тип объекта"), "got: {reply}");
    assert!(!reply.contains("ЗАПУСТИТЬ_КАЛЬКУЛЯТОР"));
    assert!(state.sessions.has_dialog(&sid).await);

    let reply = say(&state, &sid, "Отмена").await;
    assert_eq!(reply, CANCELLED_REPLY);
    assert!(!state.sessions.has_dialog(&sid).await);
    assert!(state.sessions.last_estimate(&sid).await.is_none());

    let metrics = state.metrics.get_metrics().await;
    assert_eq!(metrics.route_usage.get("llm_calculator"), Some(&1));
    assert_eq!(metrics.calculator_usage.get("lighting"), Some(&1));
}

#[tokio::test]
async fn test_several_services_start_combined_calculator() {
    let state = AppState::new(Duration::from_secs(60));
    let sid = state.sessions.create_session().await;

    say(&state, &sid, "Сколько стоит поставить розетки и освещение?").await;
    assert!(state.sessions.has_dialog(&sid).await);
    let metrics = state.metrics.get_metrics().await;
    assert_eq!(metrics.calculator_usage.get("multi"), Some(&1));

    let reply = say(&state, &sid, "1").await;
    assert!(reply.contains("площадь"), "got: {reply}");
    // absurd and overflowing areas are asked again
    for area in ["99999999", &"9".repeat(400)] {
        let reply = say(&state, &sid, area).await;
        assert!(reply.starts_with("Не удалось распознать ответ"), "got: {reply}");
    }

    let mut reply = String::new();
    for answer in ["70", "1", "нет", "нет", "1, 2", "авто", "12", "3", "авто"] {
        reply = say(&state, &sid, answer).await;
    }
    assert!(reply.contains("Общая стоимость"), "got: {reply}");
    let estimate = state.sessions.last_estimate(&sid).await.unwrap();
    assert_eq!(estimate.sections.len(), 4);
    assert!(estimate.total > 0);
}

#[tokio::test]
async fn test_huge_counts_are_asked_again() {
    let state = AppState::new(Duration::from_secs(60));
    let sid = state.sessions.create_session().await;

    let question = "Сколько стоит установить розетки в квартире, стены бетон";
    let reply = say(&state, &sid, question).await;
    assert!(reply.contains("одинарных розеток"), "got: {reply}");

    let reply = say(&state, &sid, "4000000000").await;
    assert!(reply.starts_with("Не удалось распознать ответ"), "got: {reply}");
    assert!(reply.contains("одинарных розеток"));
    assert!(state.sessions.has_dialog(&sid).await);

    let reply = say(&state, &sid, "8").await;
    assert!(!reply.starts_with("Не удалось распознать ответ"), "got: {reply}");
}

#[tokio::test]
async fn test_contact_question_asks_for_form() {
    let state = AppState::new(Duration::from_secs(60));
    let sid = state.sessions.create_session().await;

    let reply = say(&state, &sid, "Как с вами связаться?").await;
    assert!(reply.contains(CONTACT_FORM_SENTINEL));
    assert!(!state.sessions.has_dialog(&sid).await);
}
