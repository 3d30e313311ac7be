//! The transport seam: connection attempts and live-connection capabilities.
//!
//! The lifecycle manager never touches sockets or payload bytes itself. A
//! [`Transport`] implementation owns the event loop, performs the actual
//! connect, and hands back an opaque [`ConnectionHandle`]. Everything the
//! client core needs from either is expressed here.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::config::ClientConfig;

/// Failure cause reported by a transport, shared so that completion readers
/// can all observe it.
pub type TransportError = Arc<dyn std::error::Error + Send + Sync>;

/// Capability representing a live connection.
///
/// Handles are cheap to clone; all clones refer to the same underlying
/// connection.
pub trait ConnectionHandle: Clone + Send + Sync + 'static {
    /// Resolves exactly once when the underlying connection closes, for
    /// any reason. Each call returns a future observing the same event.
    fn closed(&self) -> BoxFuture<'static, ()>;

    /// Live-rebind notification: after a reconnection that follows an
    /// earlier successful cycle, the stale handle receives the replacement
    /// so in-flight operations can be redirected.
    ///
    /// Only handle types that support live rebinding need to implement
    /// this; the default does nothing. Holders that do not rebind should
    /// re-query [`TcpClient::connection`](crate::TcpClient::connection)
    /// instead.
    fn reconnected(&self, _replacement: &Self) {}
}

/// Produces connection attempts and owns the I/O resources behind them.
pub trait Transport: Send + Sync + 'static {
    /// The live-connection capability this transport produces.
    type Handle: ConnectionHandle;

    /// Starts one connection attempt to `address`.
    ///
    /// The returned future resolves exactly once, with either a live handle
    /// or the failure cause. Socket options in `config` (buffer sizes,
    /// keepalive, linger, no-delay, connect timeout) and the I/O sizing
    /// knobs (`io_threads`, `dispatch_backlog`) are the transport's to
    /// interpret; the lifecycle core forwards them opaquely.
    fn connect(
        &self,
        address: SocketAddr,
        config: &ClientConfig,
    ) -> BoxFuture<'static, Result<Self::Handle, TransportError>>;

    /// Releases all transport-owned resources (worker threads, event-loop
    /// state). The returned future resolves once the transport has
    /// acknowledged shutdown; see
    /// [`ClientConfig::shutdown_grace`](crate::ClientConfig::shutdown_grace)
    /// for the additional quiesce window the lifecycle waits afterwards.
    fn shutdown(&self) -> BoxFuture<'static, ()>;
}
