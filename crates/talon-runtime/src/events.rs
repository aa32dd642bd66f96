//! In-process event bus.
//!
//! Handlers subscribe by event name. Each delivery runs every subscribed
//! handler in its own task; a handler that errors or panics is logged and
//! does not affect the others or the emitter.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use parking_lot::RwLock;
use talon_core::{EventArgs, EventHandler};
use tracing::{Instrument, debug, error, info_span};

struct Subscription {
    class: &'static str,
    handler: Arc<dyn EventHandler>,
    once: bool,
    fired: AtomicBool,
}

/// Event name to subscribed handlers, in subscription order.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<String, Vec<Arc<Subscription>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `handler` to `event`. A `once` handler is removed after its
    /// first delivery.
    pub fn subscribe(&self, event: impl Into<String>, handler: Arc<dyn EventHandler>, once: bool) {
        let subscription = Arc::new(Subscription {
            class: handler.class_name(),
            handler,
            once,
            fired: AtomicBool::new(false),
        });
        self.handlers
            .write()
            .entry(event.into())
            .or_default()
            .push(subscription);
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.read().get(event).map_or(0, Vec::len)
    }

    /// Names of the events with at least one handler, sorted.
    pub fn events(&self) -> Vec<String> {
        let mut events: Vec<String> = self
            .handlers
            .read()
            .iter()
            .filter(|(_, subs)| !subs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        events.sort();
        events
    }

    pub fn clear(&self) {
        self.handlers.write().clear();
    }

    /// Delivers `args` to the handlers of its event and waits for all of
    /// them. Returns the number of handlers run.
    pub async fn emit(&self, args: EventArgs) -> usize {
        let selected = self.take_handlers(args.name());
        if selected.is_empty() {
            return 0;
        }

        debug!(event = args.name(), handlers = selected.len(), "Dispatching event");
        let args = Arc::new(args);

        let tasks = selected.iter().map(|subscription| {
            let subscription = Arc::clone(subscription);
            let args = Arc::clone(&args);
            let span = info_span!("event", event = %args.name(), class = subscription.class);
            tokio::spawn(run_handler(subscription, args).instrument(span))
        });

        for (subscription, result) in selected.iter().zip(join_all(tasks).await) {
            if let Err(e) = result {
                error!(
                    event = args.name(),
                    class = subscription.class,
                    error = %e,
                    "Event handler panicked"
                );
            }
        }

        selected.len()
    }

    /// Handlers to run for `event`; claims and unsubscribes `once` handlers.
    fn take_handlers(&self, event: &str) -> Vec<Arc<Subscription>> {
        let selected: Vec<Arc<Subscription>> = {
            let handlers = self.handlers.read();
            let Some(subs) = handlers.get(event) else {
                return Vec::new();
            };
            subs.iter()
                .filter(|sub| !sub.once || !sub.fired.swap(true, Ordering::AcqRel))
                .cloned()
                .collect()
        };

        if selected.iter().any(|sub| sub.once) {
            let mut handlers = self.handlers.write();
            if let Some(subs) = handlers.get_mut(event) {
                subs.retain(|sub| !(sub.once && sub.fired.load(Ordering::Acquire)));
                if subs.is_empty() {
                    handlers.remove(event);
                }
            }
        }

        selected
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.events())
            .finish()
    }
}

async fn run_handler(subscription: Arc<Subscription>, args: Arc<EventArgs>) {
    let handler = subscription.handler.as_ref();
    let result = async {
        handler.before_execute(&args).await?;
        handler.execute(&args).await?;
        handler.after_execute(&args).await
    }
    .await;

    if let Err(e) = result {
        handler.on_error(&args, &e).await;
        error!(error = %e, "Event handler failed");
    }
}
