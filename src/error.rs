//! Error types surfaced by the client lifecycle.

use std::net::SocketAddr;

use thiserror::Error;

use crate::transport::TransportError;

/// Failure reported through the connection completion.
///
/// All variants are `Clone` because the completion is multi-reader: every
/// reader observes the same outcome, so the underlying cause is shared.
#[derive(Debug, Clone)]
pub enum ConnectError {
    /// `open()` was called on a client that has been explicitly closed.
    Closed,

    /// An attempt failed while reconnection was disabled; the cause wraps
    /// the transport-reported error.
    Transport {
        /// The address of the failed attempt.
        address: SocketAddr,
        /// The transport-reported cause.
        cause: TransportError,
    },

    /// The reconnection policy gave up before any attempt succeeded.
    ReconnectExhausted {
        /// The address of the final failed attempt.
        address: SocketAddr,
        /// Number of failed attempts in the streak.
        attempts: u32,
        /// The cause of the final failure.
        cause: TransportError,
    },
}

impl std::fmt::Display for ConnectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectError::Closed => write!(f, "client has been closed"),
            ConnectError::Transport { address, cause } => {
                write!(f, "connection to {} failed: {}", address, cause)
            }
            ConnectError::ReconnectExhausted {
                address,
                attempts,
                cause,
            } => write!(
                f,
                "reconnection to {} abandoned after {} attempts: {}",
                address, attempts, cause
            ),
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectError::Closed => None,
            ConnectError::Transport { cause, .. }
            | ConnectError::ReconnectExhausted { cause, .. } => {
                Some(cause.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// Failure reported through the shutdown completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShutdownError {
    /// The teardown task was cancelled before transport resources were
    /// confirmed quiesced. The interruption is surfaced to waiters rather
    /// than being swallowed.
    #[error("shutdown interrupted before transport teardown completed")]
    Interrupted,
}
