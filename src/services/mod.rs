// src/services/mod.rs
pub mod chatbot;
pub mod leads;
pub mod llm;
pub mod mailer;
pub mod metrics_manager;
pub mod session_manager;
