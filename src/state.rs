//! Lifecycle state and attempt bookkeeping.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Observable state of the client lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Constructed, no attempt started yet.
    Idle,

    /// An attempt is in flight.
    Connecting,

    /// A live connection is established.
    Connected,

    /// A retry is scheduled or a dropped connection is being re-established.
    Reconnecting,

    /// Explicitly closed; terminal.
    Closed,
}

/// Shared lifecycle state, safe to mutate from any completion callback.
///
/// `Closed` is sticky: once entered, no transition leaves it. The attempt
/// counter is incremented once per failed attempt and reset to zero by the
/// first success after a failure streak; both operations are atomic so
/// concurrent callbacks cannot produce an inconsistent count.
pub(crate) struct LifecycleState {
    state: AtomicU8,
    attempts: AtomicU32,
}

impl LifecycleState {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(encode(ConnectionState::Idle)),
            attempts: AtomicU32::new(0),
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        decode(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state() == ConnectionState::Closed
    }

    /// Moves to `next` unless the lifecycle is already closed.
    pub(crate) fn transition(&self, next: ConnectionState) {
        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (decode(current) != ConnectionState::Closed).then_some(encode(next))
            });
    }

    pub(crate) fn mark_closed(&self) {
        self.state
            .store(encode(ConnectionState::Closed), Ordering::Release);
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Acquire)
    }

    /// Increments the failure streak and returns the 1-based attempt number.
    pub(crate) fn increment_attempts(&self) -> u32 {
        self.attempts.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn reset_attempts(&self) {
        self.attempts.store(0, Ordering::Release);
    }
}

impl std::fmt::Debug for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleState")
            .field("state", &self.state())
            .field("attempts", &self.attempts())
            .finish()
    }
}

fn encode(state: ConnectionState) -> u8 {
    match state {
        ConnectionState::Idle => 0,
        ConnectionState::Connecting => 1,
        ConnectionState::Connected => 2,
        ConnectionState::Reconnecting => 3,
        ConnectionState::Closed => 4,
    }
}

fn decode(raw: u8) -> ConnectionState {
    match raw {
        0 => ConnectionState::Idle,
        1 => ConnectionState::Connecting,
        2 => ConnectionState::Connected,
        3 => ConnectionState::Reconnecting,
        _ => ConnectionState::Closed,
    }
}
