//! The reconnecting client lifecycle.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use crate::completion::Completion;
use crate::config::ClientConfig;
use crate::error::ConnectError;
use crate::events::ClientEvent;
use crate::policy::{ReconnectDecision, ReconnectPolicy};
use crate::shutdown::{ShutdownCoordinator, ShutdownFuture};
use crate::state::{ConnectionState, LifecycleState};
use crate::transport::{ConnectionHandle, Transport, TransportError};

/// The eventual outcome of [`TcpClient::open`]: the connection, once
/// available, or the failure that ended the attempt streak.
pub type ConnectFuture<H> = Completion<Result<H, ConnectError>>;

/// A self-healing outbound client.
///
/// `open` starts one connection attempt and returns a shared
/// [`ConnectFuture`] representing "the connection, once available". While a
/// reconnection policy is armed, dropped connections and failed attempts are
/// retried automatically; the future resolves once, with the first
/// successful connection. `close` disarms reconnection and tears the
/// transport down gracefully.
///
/// All lifecycle work (attempts, close notifications, retry timers, and
/// teardown) runs on runtime tasks, never on the caller's thread; `open`
/// and `close` must therefore be called from within a tokio runtime.
pub struct TcpClient<T: Transport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for TcpClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T: Transport> {
    transport: T,
    config: ClientConfig,
    address: Mutex<SocketAddr>,
    // Some = reconnection armed. Cleared exactly once, by close(), and
    // never re-armed; every retry path re-checks this slot before acting.
    policy: Mutex<Option<Arc<dyn ReconnectPolicy>>>,
    state: LifecycleState,
    completion: ConnectFuture<T::Handle>,
    current: Mutex<Option<T::Handle>>,
    shutdown: Mutex<Option<ShutdownFuture>>,
}

impl<T: Transport> TcpClient<T> {
    /// Creates a client targeting `address`.
    ///
    /// The reconnection policy, socket options, and event listeners all
    /// come from `config`.
    pub fn new(transport: T, address: SocketAddr, config: ClientConfig) -> Self {
        let policy = config.reconnect.clone();
        Self {
            inner: Arc::new(Inner {
                transport,
                config,
                address: Mutex::new(address),
                policy: Mutex::new(policy),
                state: LifecycleState::new(),
                completion: ConnectFuture::new(),
                current: Mutex::new(None),
                shutdown: Mutex::new(None),
            }),
        }
    }

    /// Starts a connection attempt and returns the shared connection future.
    ///
    /// Non-blocking: callbacks are registered and the (already existing)
    /// future is returned immediately. Repeated calls while reconnection is
    /// armed return the same future. After [`close`](Self::close) the
    /// returned future is failed with [`ConnectError::Closed`].
    pub fn open(&self) -> ConnectFuture<T::Handle> {
        if self.inner.state.is_closed() {
            return ConnectFuture::fulfilled(Err(ConnectError::Closed));
        }
        self.inner.state.transition(ConnectionState::Connecting);
        Inner::spawn_attempt(&self.inner);
        self.inner.completion.clone()
    }

    /// Disarms reconnection and tears the transport down.
    ///
    /// The policy slot is cleared synchronously, before this method
    /// returns, so a queued retry timer or an in-flight close notification
    /// can no longer re-open the connection. The returned future resolves
    /// once the transport's shutdown signal has resolved and the configured
    /// grace window has elapsed. Idempotent: repeated calls return the same
    /// future.
    pub fn close(&self) -> ShutdownFuture {
        lock(&self.inner.policy).take();

        let mut slot = lock(&self.inner.shutdown);
        if let Some(existing) = slot.as_ref() {
            return existing.clone();
        }
        self.inner.state.mark_closed();

        let coordinator = ShutdownCoordinator::new(self.inner.config.shutdown_grace);
        let shutdown = coordinator.begin(self.inner.transport.shutdown());
        *slot = Some(shutdown.clone());
        shutdown
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.state()
    }

    /// Failed attempts in the current streak; 0 while connected.
    pub fn attempts(&self) -> u32 {
        self.inner.state.attempts()
    }

    /// The newest live handle, if any.
    ///
    /// The [`ConnectFuture`] keeps the handle of the *first* successful
    /// connection; after a reconnection this accessor is the way to reach
    /// the replacement (rebind-capable handles are additionally notified
    /// through [`ConnectionHandle::reconnected`]).
    pub fn connection(&self) -> Option<T::Handle> {
        lock(&self.inner.current).clone()
    }

    /// The address the next attempt will target.
    pub fn remote_address(&self) -> SocketAddr {
        *lock(&self.inner.address)
    }
}

impl<T: Transport> Inner<T> {
    fn reconnect_enabled(&self) -> bool {
        lock(&self.policy).is_some()
    }

    fn spawn_attempt(inner: &Arc<Self>) {
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            let address = *lock(&inner.address);
            match inner.transport.connect(address, &inner.config).await {
                Ok(handle) => Self::on_connected(&inner, address, handle),
                Err(cause) => Self::on_failed(&inner, address, cause),
            }
        });
    }

    fn on_connected(inner: &Arc<Self>, address: SocketAddr, handle: T::Handle) {
        inner.state.reset_attempts();
        inner.state.transition(ConnectionState::Connected);

        #[cfg(feature = "tracing")]
        tracing::info!(%address, "connected");
        #[cfg(feature = "metrics")]
        metrics::counter!("tcp_reconnect.connections").increment(1);

        inner.config.events.emit(&ClientEvent::Connected {
            address,
            timestamp: Instant::now(),
        });

        Self::watch_close(inner, address, &handle);

        let previous = lock(&inner.current).replace(handle.clone());
        if !inner.completion.fulfill(Ok(handle.clone())) {
            // Reconnection after an earlier successful cycle: the future
            // stays resolved with the first handle. Notify the policy and
            // hand the replacement to the stale handle so holders can
            // redirect in-flight operations.
            if let Some(policy) = lock(&inner.policy).clone() {
                policy.reconnected();
            }
            if let Some(stale) = previous {
                stale.reconnected(&handle);
            }

            #[cfg(feature = "metrics")]
            metrics::counter!("tcp_reconnect.reconnections").increment(1);

            inner.config.events.emit(&ClientEvent::Reconnected {
                address,
                timestamp: Instant::now(),
            });
        }
    }

    fn watch_close(inner: &Arc<Self>, address: SocketAddr, handle: &T::Handle) {
        let closed = handle.closed();
        let watcher = Arc::clone(inner);
        tokio::spawn(async move {
            closed.await;

            #[cfg(feature = "tracing")]
            tracing::info!(%address, "connection closed");

            watcher.config.events.emit(&ClientEvent::ConnectionClosed {
                address,
                timestamp: Instant::now(),
            });

            if watcher.reconnect_enabled() {
                watcher.state.transition(ConnectionState::Reconnecting);
                Self::spawn_attempt(&watcher);
            }
        });
    }

    fn on_failed(inner: &Arc<Self>, address: SocketAddr, cause: TransportError) {
        #[cfg(feature = "metrics")]
        metrics::counter!("tcp_reconnect.failed_attempts").increment(1);

        let Some(policy) = lock(&inner.policy).clone() else {
            // Reconnection disabled (or disarmed by close): escalate the
            // first failure; a no-op if a prior success already resolved
            // the future.
            inner
                .completion
                .fulfill(Err(ConnectError::Transport { address, cause }));
            return;
        };

        let attempt = inner.state.increment_attempts();
        match policy.decide(address, attempt) {
            ReconnectDecision::Retry {
                address: next,
                delay,
            } => {
                #[cfg(feature = "tracing")]
                tracing::info!(attempt, address = %next, ?delay, "scheduling reconnect");

                inner.config.events.emit(&ClientEvent::RetryScheduled {
                    address: next,
                    attempt,
                    delay,
                    timestamp: Instant::now(),
                });

                *lock(&inner.address) = next;
                inner.state.transition(ConnectionState::Reconnecting);

                let timer = Arc::clone(inner);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    // Re-check at fire time: an explicit close() must win
                    // over an already-queued retry, and revoking the timer
                    // itself would race with its firing.
                    if timer.reconnect_enabled() {
                        Self::spawn_attempt(&timer);
                    }
                });
            }
            ReconnectDecision::GiveUp => {
                #[cfg(feature = "tracing")]
                tracing::error!(%address, attempts = attempt, "reconnection abandoned");
                #[cfg(feature = "metrics")]
                metrics::counter!("tcp_reconnect.exhausted").increment(1);

                inner.config.events.emit(&ClientEvent::ReconnectExhausted {
                    address,
                    attempts: attempt,
                    timestamp: Instant::now(),
                });

                // Escalates only before the first success; afterwards the
                // event above is the sole report.
                inner.completion.fulfill(Err(ConnectError::ReconnectExhausted {
                    address,
                    attempts: attempt,
                    cause,
                }));
            }
        }
    }
}

impl<T: Transport> std::fmt::Debug for TcpClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpClient")
            .field("address", &self.remote_address())
            .field("state", &self.state())
            .field("attempts", &self.attempts())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
