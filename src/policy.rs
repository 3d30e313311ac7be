//! Reconnection policies deciding whether, when, and where to retry.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::backoff::{
    ExponentialBackoff, ExponentialRandomBackoff, FixedInterval, IntervalFunction,
};

/// The outcome of consulting a [`ReconnectPolicy`] after a failed attempt.
///
/// Produced fresh for every failure and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Try again at `address` after waiting `delay`.
    ///
    /// Returning a different address redirects the client: the tracked
    /// connect target is replaced before the retry timer is scheduled.
    Retry {
        /// The address for the next attempt.
        address: SocketAddr,
        /// How long to wait before the next attempt.
        delay: Duration,
    },
    /// Stop retrying and surface the failure.
    GiveUp,
}

/// Pluggable strategy consulted exactly once per failed connection attempt.
///
/// `attempt` is pre-incremented and 1-based: the first failure of a streak
/// is attempt 1. The counter resets after a successful connection, so a
/// later disconnect starts a fresh streak at 1.
pub trait ReconnectPolicy: Send + Sync {
    /// Decides whether to retry after the given failed attempt.
    fn decide(&self, address: SocketAddr, attempt: u32) -> ReconnectDecision;

    /// Called after a successful reconnection that follows an earlier
    /// successful cycle. The default does nothing.
    fn reconnected(&self) {}
}

/// A [`ReconnectPolicy`] that retries at the original address using a
/// backoff strategy, with an optional attempt limit.
pub struct BackoffPolicy {
    interval: Arc<dyn IntervalFunction>,
    max_attempts: Option<u32>,
}

impl BackoffPolicy {
    /// Creates a policy from any backoff strategy, with unlimited attempts.
    pub fn new<I>(interval: I) -> Self
    where
        I: IntervalFunction + 'static,
    {
        Self {
            interval: Arc::new(interval),
            max_attempts: None,
        }
    }

    /// Creates a fixed-delay policy.
    pub fn fixed(delay: Duration) -> Self {
        Self::new(FixedInterval::new(delay))
    }

    /// Creates an exponential backoff policy capped at `max_delay`.
    pub fn exponential(initial_delay: Duration, max_delay: Duration) -> Self {
        Self::new(ExponentialBackoff::new(initial_delay).max_delay(max_delay))
    }

    /// Creates an exponential backoff policy with jitter, capped at
    /// `max_delay`.
    pub fn exponential_random(
        initial_delay: Duration,
        max_delay: Duration,
        randomization_factor: f64,
    ) -> Self {
        Self::new(
            ExponentialRandomBackoff::new(initial_delay, randomization_factor)
                .max_delay(max_delay),
        )
    }

    /// Limits the number of attempts before giving up.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Removes any attempt limit.
    pub fn unlimited_attempts(mut self) -> Self {
        self.max_attempts = None;
        self
    }
}

impl ReconnectPolicy for BackoffPolicy {
    fn decide(&self, address: SocketAddr, attempt: u32) -> ReconnectDecision {
        match self.max_attempts {
            Some(max) if attempt > max => ReconnectDecision::GiveUp,
            _ => ReconnectDecision::Retry {
                address,
                delay: self.interval.next_delay(attempt),
            },
        }
    }
}

impl std::fmt::Debug for BackoffPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackoffPolicy")
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

/// Function-based policy for custom decision logic, including redirecting
/// retries to a different address.
pub struct FnPolicy<F> {
    f: F,
}

impl<F> FnPolicy<F>
where
    F: Fn(SocketAddr, u32) -> ReconnectDecision + Send + Sync,
{
    /// Creates a policy from a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> ReconnectPolicy for FnPolicy<F>
where
    F: Fn(SocketAddr, u32) -> ReconnectDecision + Send + Sync,
{
    fn decide(&self, address: SocketAddr, attempt: u32) -> ReconnectDecision {
        (self.f)(address, attempt)
    }
}
