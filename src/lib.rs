//! Self-healing asynchronous connection lifecycle for outbound clients.
//!
//! This crate turns a single "connect to address X" operation into a durable
//! client: one future-like handle represents "the connection, once
//! available", failed or dropped connections are retried according to a
//! pluggable policy, and shutdown tears the transport down gracefully
//! without leaking pending retries.
//!
//! Byte-level I/O stays out of scope: the actual socket work lives behind
//! the [`Transport`] trait, and the lifecycle core only ever sees opaque
//! connection attempts and [`ConnectionHandle`] capabilities.
//!
//! # Features
//!
//! - **Automatic reconnection**: dropped connections re-open themselves
//!   while a policy is armed; failed attempts are retried with flexible
//!   backoff (fixed, exponential, randomized, custom)
//! - **Single completion**: [`Completion`] is a single-assignment,
//!   multi-reader future; every caller observes the first successful
//!   connection, and racing outcomes are absorbed idempotently
//! - **Address redirection**: a policy can point a retry at a different
//!   address
//! - **Graceful shutdown**: `close()` disarms reconnection synchronously
//!   and waits out a bounded grace window for transport teardown
//! - **Event system**: injected listeners observe connects, closes,
//!   retries, and exhaustion; `tracing` and `metrics` are optional features
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use tcp_reconnect::{BackoffPolicy, ClientConfig, FnListener};
//!
//! let config = ClientConfig::builder()
//!     .connect_timeout(Duration::from_secs(5))
//!     .reconnect(
//!         BackoffPolicy::exponential(
//!             Duration::from_millis(100),
//!             Duration::from_secs(5),
//!         )
//!         .max_attempts(10),
//!     )
//!     .listener(FnListener::new(|event| {
//!         eprintln!("{}: {}", event.event_type(), event.address());
//!     }))
//!     .build();
//! # let _ = config;
//! ```
//!
//! With a [`Transport`] implementation in hand:
//!
//! ```rust,ignore
//! let client = TcpClient::new(transport, "10.0.0.1:6379".parse()?, config);
//! let connection = client.open().wait().await?;
//! // ... use the connection; it re-establishes itself if dropped ...
//! client.close().wait().await?;
//! ```

mod backoff;
mod client;
mod completion;
mod config;
mod error;
mod events;
mod policy;
mod shutdown;
mod state;
mod transport;

pub use backoff::{
    ExponentialBackoff, ExponentialRandomBackoff, FixedInterval, FnInterval, IntervalFunction,
};
pub use client::{ConnectFuture, TcpClient};
pub use completion::Completion;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ConnectError, ShutdownError};
pub use events::{ClientEvent, EventListener, EventListeners, FnListener};
pub use policy::{BackoffPolicy, FnPolicy, ReconnectDecision, ReconnectPolicy};
pub use shutdown::ShutdownFuture;
pub use state::ConnectionState;
pub use transport::{ConnectionHandle, Transport, TransportError};
