// src/widget/runtime.rs
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use super::autofill::{FormFiller, HostPage};
use super::reducer::{Effect, WidgetEvent, update};
use super::transport::ChatTransport;
use super::{WidgetConfig, WidgetContext};

/// Whatever draws the widget: DOM glue, a terminal, a test recorder.
pub trait WidgetView: Send {
    fn apply(&mut self, effect: &Effect);
}

/// Feeds UI events into a running widget.
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    tx: UnboundedSender<WidgetEvent>,
}

impl WidgetHandle {
    /// `false` once the widget has stopped.
    pub fn send(&self, event: WidgetEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

pub struct WidgetRuntime<T, F, V> {
    ctx: WidgetContext,
    transport: Arc<T>,
    filler: F,
    view: V,
    events: UnboundedReceiver<WidgetEvent>,
    /// Replies and timers from spawned tasks.
    internal_tx: UnboundedSender<WidgetEvent>,
    internal_rx: UnboundedReceiver<WidgetEvent>,
    pending: usize,
}

impl<T, F, V> WidgetRuntime<T, F, V>
where
    T: ChatTransport,
    F: FormFiller,
    V: WidgetView,
{
    /// Attach a widget to `host`. An injected widget whose container is
    /// missing is not mounted; that is logged and `None` returned.
    pub fn mount(
        config: WidgetConfig,
        host: &HostPage,
        transport: T,
        filler: F,
        view: V,
    ) -> Option<(Self, WidgetHandle)> {
        Self::mount_with(WidgetContext::new(config), host, transport, filler, view)
    }

    pub fn mount_with(
        ctx: WidgetContext,
        host: &HostPage,
        transport: T,
        filler: F,
        view: V,
    ) -> Option<(Self, WidgetHandle)> {
        if ctx.config.needs_container() && !host.has_element(&ctx.config.container_id) {
            error!(
                container = %ctx.config.container_id,
                "chat widget container not found, widget not mounted"
            );
            return None;
        }

        let (tx, events) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        info!(session_id = %ctx.session_id, variant = ?ctx.config.variant, "chat widget mounted");
        let runtime = Self {
            ctx,
            transport: Arc::new(transport),
            filler,
            view,
            events,
            internal_tx,
            internal_rx,
            pending: 0,
        };
        Some((runtime, WidgetHandle { tx }))
    }

    pub fn context(&self) -> &WidgetContext {
        &self.ctx
    }

    /// Process events until every handle is dropped and no request or timer
    /// is pending. Returns the final context.
    pub async fn run(mut self) -> WidgetContext {
        let mut attached = true;
        while attached || self.pending > 0 {
            tokio::select! {
                event = self.events.recv(), if attached => match event {
                    Some(event) => self.handle(event),
                    None => attached = false,
                },
                Some(event) = self.internal_rx.recv() => {
                    self.pending -= 1;
                    self.handle(event);
                }
            }
        }
        debug!(session_id = %self.ctx.session_id, "chat widget stopped");
        self.ctx
    }

    pub fn handle(&mut self, event: WidgetEvent) {
        for effect in update(&mut self.ctx, event) {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match &effect {
            Effect::Post { request_id, request } => {
                let tx = self.internal_tx.clone();
                let transport = Arc::clone(&self.transport);
                let (request_id, request) = (*request_id, request.clone());
                tokio::spawn(async move {
                    let outcome = transport.send(request).await;
                    let _ = tx.send(WidgetEvent::Reply { request_id, outcome });
                });
                self.pending += 1;
            }
            Effect::ScheduleOverlay(delay) => {
                let tx = self.internal_tx.clone();
                let delay = *delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(WidgetEvent::OverlayDue);
                });
                self.pending += 1;
            }
            Effect::ReportContact(request) => {
                let tx = self.internal_tx.clone();
                let transport = Arc::clone(&self.transport);
                let request = request.clone();
                tokio::spawn(async move {
                    let outcome = transport.submit_contact(request).await;
                    let _ = tx.send(WidgetEvent::ContactDelivered(outcome));
                });
                self.pending += 1;
            }
            Effect::Autofill(contact) => {
                if let Err(e) = self.filler.fill(contact) {
                    warn!(error = %e, "host form autofill failed");
                }
            }
            _ => {}
        }
        self.view.apply(&effect);
    }
}
