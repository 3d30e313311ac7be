//! Client configuration: socket options, I/O sizing, and reconnection.

use std::sync::Arc;
use std::time::Duration;

use crate::events::{EventListener, EventListeners};
use crate::policy::ReconnectPolicy;

const DEFAULT_DISPATCH_BACKLOG: usize = 128;
const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Configuration for a [`TcpClient`](crate::TcpClient).
///
/// Socket options and I/O sizing are forwarded opaquely to the
/// [`Transport`](crate::Transport); only the reconnection policy, the event
/// listeners, and the shutdown grace window are interpreted by the
/// lifecycle core itself.
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) io_threads: usize,
    pub(crate) dispatch_backlog: usize,
    pub(crate) connect_timeout: Duration,
    pub(crate) rcvbuf: usize,
    pub(crate) sndbuf: usize,
    pub(crate) keep_alive: bool,
    pub(crate) linger: Option<Duration>,
    pub(crate) no_delay: bool,
    pub(crate) shutdown_grace: Duration,
    pub(crate) reconnect: Option<Arc<dyn ReconnectPolicy>>,
    pub(crate) events: EventListeners,
}

impl ClientConfig {
    /// Creates a new builder with default settings.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Number of I/O threads the transport should use.
    pub fn io_threads(&self) -> usize {
        self.io_threads
    }

    /// Backlog of the per-connection event dispatcher.
    pub fn dispatch_backlog(&self) -> usize {
        self.dispatch_backlog
    }

    /// Timeout for a single connection attempt.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Socket receive buffer size in bytes.
    pub fn rcvbuf(&self) -> usize {
        self.rcvbuf
    }

    /// Socket send buffer size in bytes.
    pub fn sndbuf(&self) -> usize {
        self.sndbuf
    }

    /// Whether TCP keepalive is requested.
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// `SO_LINGER` duration, if any.
    pub fn linger(&self) -> Option<Duration> {
        self.linger
    }

    /// Whether Nagle's algorithm is disabled.
    pub fn no_delay(&self) -> bool {
        self.no_delay
    }

    /// How long to wait after the transport acknowledges shutdown for its
    /// asynchronous internal teardown to quiesce.
    pub fn shutdown_grace(&self) -> Duration {
        self.shutdown_grace
    }

    /// Returns `true` if a reconnection policy is configured.
    pub fn reconnect_enabled(&self) -> bool {
        self.reconnect.is_some()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("io_threads", &self.io_threads)
            .field("dispatch_backlog", &self.dispatch_backlog)
            .field("connect_timeout", &self.connect_timeout)
            .field("rcvbuf", &self.rcvbuf)
            .field("sndbuf", &self.sndbuf)
            .field("keep_alive", &self.keep_alive)
            .field("linger", &self.linger)
            .field("no_delay", &self.no_delay)
            .field("shutdown_grace", &self.shutdown_grace)
            .field("reconnect", &self.reconnect.is_some())
            .field("listeners", &self.events.len())
            .finish()
    }
}

/// Builder for [`ClientConfig`].
pub struct ClientConfigBuilder {
    io_threads: usize,
    dispatch_backlog: usize,
    connect_timeout: Duration,
    rcvbuf: usize,
    sndbuf: usize,
    keep_alive: bool,
    linger: Option<Duration>,
    no_delay: bool,
    shutdown_grace: Duration,
    reconnect: Option<Arc<dyn ReconnectPolicy>>,
    events: EventListeners,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            io_threads: std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1),
            dispatch_backlog: DEFAULT_DISPATCH_BACKLOG,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            rcvbuf: DEFAULT_BUFFER_SIZE,
            sndbuf: DEFAULT_BUFFER_SIZE,
            keep_alive: true,
            linger: None,
            no_delay: true,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            reconnect: None,
            events: EventListeners::new(),
        }
    }
}

impl ClientConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of I/O threads the transport should use.
    ///
    /// Defaults to the number of available processing units.
    pub fn io_threads(mut self, io_threads: usize) -> Self {
        self.io_threads = io_threads;
        self
    }

    /// Sets the backlog of the per-connection event dispatcher.
    ///
    /// Defaults to 128.
    pub fn dispatch_backlog(mut self, dispatch_backlog: usize) -> Self {
        self.dispatch_backlog = dispatch_backlog;
        self
    }

    /// Sets the timeout for a single connection attempt.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use tcp_reconnect::ClientConfig;
    ///
    /// let config = ClientConfig::builder()
    ///     .connect_timeout(Duration::from_secs(5))
    ///     .build();
    /// assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    /// ```
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Sets the socket receive buffer size in bytes.
    pub fn rcvbuf(mut self, rcvbuf: usize) -> Self {
        self.rcvbuf = rcvbuf;
        self
    }

    /// Sets the socket send buffer size in bytes.
    pub fn sndbuf(mut self, sndbuf: usize) -> Self {
        self.sndbuf = sndbuf;
        self
    }

    /// Enables or disables TCP keepalive.
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Sets `SO_LINGER`.
    pub fn linger(mut self, linger: Duration) -> Self {
        self.linger = Some(linger);
        self
    }

    /// Enables or disables `TCP_NODELAY`.
    pub fn no_delay(mut self, no_delay: bool) -> Self {
        self.no_delay = no_delay;
        self
    }

    /// Sets the grace window waited after the transport acknowledges
    /// shutdown, covering runtimes whose internal teardown lags the
    /// acknowledgment. Defaults to one second.
    pub fn shutdown_grace(mut self, shutdown_grace: Duration) -> Self {
        self.shutdown_grace = shutdown_grace;
        self
    }

    /// Enables automatic reconnection with the given policy.
    ///
    /// Without a policy the client makes a single attempt per
    /// [`open`](crate::TcpClient::open) and surfaces the failure directly.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use tcp_reconnect::{BackoffPolicy, ClientConfig};
    ///
    /// let config = ClientConfig::builder()
    ///     .reconnect(
    ///         BackoffPolicy::exponential(
    ///             Duration::from_millis(100),
    ///             Duration::from_secs(5),
    ///         )
    ///         .max_attempts(10),
    ///     )
    ///     .build();
    /// assert!(config.reconnect_enabled());
    /// ```
    pub fn reconnect<P>(mut self, policy: P) -> Self
    where
        P: ReconnectPolicy + 'static,
    {
        self.reconnect = Some(Arc::new(policy));
        self
    }

    /// Registers a lifecycle event listener.
    ///
    /// # Examples
    ///
    /// ```
    /// use tcp_reconnect::{ClientConfig, FnListener};
    ///
    /// let config = ClientConfig::builder()
    ///     .listener(FnListener::new(|event| {
    ///         eprintln!("{} at {}", event.event_type(), event.address());
    ///     }))
    ///     .build();
    /// ```
    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: EventListener + 'static,
    {
        self.events.add(listener);
        self
    }

    /// Builds the [`ClientConfig`].
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            io_threads: self.io_threads,
            dispatch_backlog: self.dispatch_backlog,
            connect_timeout: self.connect_timeout,
            rcvbuf: self.rcvbuf,
            sndbuf: self.sndbuf,
            keep_alive: self.keep_alive,
            linger: self.linger,
            no_delay: self.no_delay,
            shutdown_grace: self.shutdown_grace,
            reconnect: self.reconnect,
            events: self.events,
        }
    }
}

impl std::fmt::Debug for ClientConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfigBuilder")
            .field("io_threads", &self.io_threads)
            .field("dispatch_backlog", &self.dispatch_backlog)
            .field("reconnect", &self.reconnect.is_some())
            .finish()
    }
}
