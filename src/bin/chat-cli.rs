// src/bin/chat-cli.rs
//! Terminal front end for the chat API, driving the same widget model as the
//! browser script.
//!
//! `chat-cli [--injected]`; endpoint from `CHAT_ENDPOINT`.

use anyhow::bail;
use savbes_chat::widget::{
    ContactForm, Effect, HostPage, HttpTransport, NoopFiller, Origin, WidgetConfig, WidgetEvent,
    WidgetRuntime, WidgetView,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/chat";

struct TerminalView;

impl WidgetView for TerminalView {
    fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::Render(entry) if entry.origin == Origin::Assistant => {
                println!("\nБот: {}\n", entry.text)
            }
            Effect::OpenOverlay => {
                println!("Оставьте контакты: /contact <телефон> [имя] [email], или /cancel");
            }
            Effect::ContactRejected => println!("Укажите номер телефона."),
            _ => {}
        }
    }
}

fn parse_contact(args: &str) -> ContactForm {
    let mut parts = args.split_whitespace();
    ContactForm {
        phone: parts.next().unwrap_or_default().to_string(),
        name: parts.next().unwrap_or_default().to_string(),
        email: parts.next().unwrap_or_default().to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let endpoint = std::env::var("CHAT_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    let config = if std::env::args().any(|arg| arg == "--injected") {
        WidgetConfig::injected(&endpoint)
    } else {
        WidgetConfig::inline(&endpoint)
    };
    let host = HostPage::default().with_element(&config.container_id);

    let Some((runtime, handle)) =
        WidgetRuntime::mount(config, &host, HttpTransport::new(&endpoint), NoopFiller, TerminalView)
    else {
        bail!("widget could not be mounted");
    };
    let widget = tokio::spawn(runtime.run());
    handle.send(WidgetEvent::Toggle);
    println!("Чат САВБЕС ({endpoint}). Пустая строка не отправляется, Ctrl-D для выхода.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let event = match line.trim() {
            "/cancel" => WidgetEvent::ContactCancelled,
            cmd if cmd.starts_with("/contact") => {
                WidgetEvent::ContactSubmitted(parse_contact(&cmd["/contact".len()..]))
            }
            _ => {
                handle.send(WidgetEvent::Input(line.clone()));
                WidgetEvent::Submit
            }
        };
        if !handle.send(event) {
            break;
        }
    }

    drop(handle);
    let ctx = widget.await?;
    if let Some(phone) = ctx.contact.phone {
        println!("Телефон в этой сессии: {phone}");
    }
    Ok(())
}
