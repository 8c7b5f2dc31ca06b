// src/main.rs
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use savbes_chat::config::Config;
use savbes_chat::routes::{cors_layer, create_router};
use savbes_chat::services::llm::DEFAULT_SYSTEM_PROMPT;
use savbes_chat::state::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    let system_prompt = load_system_prompt(&config).await;
    let state = AppState::from_config(&config, system_prompt)
        .context("cannot set up language model")?;
    let state = Arc::new(state);

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sessions.purge_expired().await;
            if removed > 0 {
                info!(removed, "expired chat sessions purged");
            }
        }
    });

    let app = create_router(state).layer(cors_layer(&config.allowed_origins));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.bind_addr))?;
    info!(
        addr = %config.bind_addr,
        public_dir = %config.public_dir.display(),
        "savbes chat running"
    );
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn load_system_prompt(config: &Config) -> String {
    let Some(path) = &config.system_prompt_path else {
        return DEFAULT_SYSTEM_PROMPT.to_string();
    };
    match tokio::fs::read_to_string(path).await {
        Ok(prompt) if !prompt.trim().is_empty() => prompt,
        Ok(_) => {
            warn!(path = %path.display(), "system prompt file is empty, using built-in prompt");
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "cannot read system prompt, using built-in prompt"
            );
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}
