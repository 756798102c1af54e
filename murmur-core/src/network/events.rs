// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event System
//!
//! Subscriber registry for realtime events. Handlers run in registration
//! order; a failing handler never stops delivery to the ones after it.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::warn;

use super::frame::RealtimeEvent;

/// Error a handler may report. Logged, never propagated.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by event handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Event handler trait.
///
/// Implement this trait to receive realtime events.
pub trait EventHandler: Send + Sync {
    /// Called for every dispatched event.
    fn on_event(&self, event: &RealtimeEvent) -> HandlerResult;
}

/// Simple callback-based event handler.
///
/// Wraps a closure for easy event handling.
pub struct CallbackHandler<F>
where
    F: Fn(&RealtimeEvent) -> HandlerResult + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(&RealtimeEvent) -> HandlerResult + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(&RealtimeEvent) -> HandlerResult + Send + Sync,
{
    fn on_event(&self, event: &RealtimeEvent) -> HandlerResult {
        (self.callback)(event)
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: BTreeMap<u64, Arc<dyn EventHandler>>,
}

/// Handle returned by [`EventDispatcher::subscribe`].
///
/// Dropping the handle keeps the handler registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Subscription {
    /// Registration id. Ids increase with registration order.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Removes the handler. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.lock().handlers.remove(&self.id).is_some(),
            None => false,
        }
    }
}

/// Outcome of one dispatch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers that returned `Ok`.
    pub delivered: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

/// Event dispatcher for managing multiple handlers.
#[derive(Default)]
pub struct EventDispatcher {
    registry: Arc<Mutex<Registry>>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an event handler.
    pub fn subscribe(&self, handler: Arc<dyn EventHandler>) -> Subscription {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.insert(id, handler);

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Removes all handlers.
    pub fn clear_handlers(&self) {
        self.registry.lock().handlers.clear();
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.registry.lock().handlers.len()
    }

    /// Dispatches an event to all handlers in registration order.
    ///
    /// The registry lock is released before handlers run, so a handler may
    /// subscribe or unsubscribe without deadlocking.
    pub fn dispatch(&self, event: &RealtimeEvent) -> DispatchReport {
        let handlers: Vec<(u64, Arc<dyn EventHandler>)> = self
            .registry
            .lock()
            .handlers
            .iter()
            .map(|(id, handler)| (*id, Arc::clone(handler)))
            .collect();

        let mut report = DispatchReport::default();
        for (id, handler) in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler.on_event(event))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    warn!(subscription = id, error = %e, "event handler failed");
                    report.failed += 1;
                }
                Err(_) => {
                    warn!(subscription = id, "event handler panicked");
                    report.failed += 1;
                }
            }
        }
        report
    }
}
