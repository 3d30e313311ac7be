//! Lifecycle events for observability.
//!
//! Listeners are injected through [`ClientConfig`](crate::ClientConfig)
//! rather than looked up ambiently, so the core stays testable without any
//! logging framework. The optional `tracing` and `metrics` features layer
//! structured logging and counters on top of the same notification points.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Events emitted by the client lifecycle.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A connection attempt succeeded.
    Connected {
        /// The address that was connected.
        address: SocketAddr,
        /// When the connection was established.
        timestamp: Instant,
    },
    /// A live connection closed, for any reason.
    ConnectionClosed {
        /// The address the connection was bound to.
        address: SocketAddr,
        /// When the close was observed.
        timestamp: Instant,
    },
    /// The policy scheduled a retry.
    RetryScheduled {
        /// The address the next attempt will target.
        address: SocketAddr,
        /// 1-based attempt number of the failure that triggered the retry.
        attempt: u32,
        /// Delay before the next attempt.
        delay: Duration,
        /// When the retry was scheduled.
        timestamp: Instant,
    },
    /// The policy gave up; reported exactly once per exhaustion.
    ReconnectExhausted {
        /// The address of the final failed attempt.
        address: SocketAddr,
        /// Number of failed attempts in the streak.
        attempts: u32,
        /// When exhaustion was decided.
        timestamp: Instant,
    },
    /// A reconnection succeeded after an earlier successful cycle.
    Reconnected {
        /// The address of the new connection.
        address: SocketAddr,
        /// When the reconnection completed.
        timestamp: Instant,
    },
}

impl ClientEvent {
    /// Returns a short tag for the event kind.
    pub fn event_type(&self) -> &'static str {
        match self {
            ClientEvent::Connected { .. } => "Connected",
            ClientEvent::ConnectionClosed { .. } => "ConnectionClosed",
            ClientEvent::RetryScheduled { .. } => "RetryScheduled",
            ClientEvent::ReconnectExhausted { .. } => "ReconnectExhausted",
            ClientEvent::Reconnected { .. } => "Reconnected",
        }
    }

    /// Returns when the event occurred.
    pub fn timestamp(&self) -> Instant {
        match self {
            ClientEvent::Connected { timestamp, .. }
            | ClientEvent::ConnectionClosed { timestamp, .. }
            | ClientEvent::RetryScheduled { timestamp, .. }
            | ClientEvent::ReconnectExhausted { timestamp, .. }
            | ClientEvent::Reconnected { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the address the event refers to.
    pub fn address(&self) -> SocketAddr {
        match self {
            ClientEvent::Connected { address, .. }
            | ClientEvent::ConnectionClosed { address, .. }
            | ClientEvent::RetryScheduled { address, .. }
            | ClientEvent::ReconnectExhausted { address, .. }
            | ClientEvent::Reconnected { address, .. } => *address,
        }
    }
}

/// Trait for listening to client lifecycle events.
pub trait EventListener: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &ClientEvent);
}

/// A simple function-based event listener.
pub struct FnListener<F>
where
    F: Fn(&ClientEvent) + Send + Sync,
{
    f: F,
}

impl<F> FnListener<F>
where
    F: Fn(&ClientEvent) + Send + Sync,
{
    /// Creates a listener from a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&ClientEvent) + Send + Sync,
{
    fn on_event(&self, event: &ClientEvent) {
        (self.f)(event)
    }
}

/// A collection of event listeners.
#[derive(Clone, Default)]
pub struct EventListeners {
    listeners: Vec<Arc<dyn EventListener>>,
}

impl EventListeners {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Adds a listener.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Emits an event to all registered listeners.
    ///
    /// A panicking listener is isolated so the remaining listeners still
    /// receive the event.
    pub fn emit(&self, event: &ClientEvent) {
        for listener in &self.listeners {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));
        }
    }

    /// Returns `true` if no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.len())
            .finish()
    }
}
