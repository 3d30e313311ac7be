//! Backoff strategies for spacing out reconnection attempts.

use std::time::Duration;

/// Abstraction for computing the delay before a reconnection attempt.
///
/// Attempt numbers are 1-based: the first failed connection produces
/// attempt `1`. Implementations must be cheap and side-effect free from
/// the caller's perspective; internal randomization (jitter) is allowed.
pub trait IntervalFunction: Send + Sync {
    /// Computes the delay before the given reconnection attempt.
    fn next_delay(&self, attempt: u32) -> Duration;
}

/// Fixed delay - the same duration for every attempt.
#[derive(Debug, Clone)]
pub struct FixedInterval {
    delay: Duration,
}

impl FixedInterval {
    /// Creates a fixed-delay interval.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl IntervalFunction for FixedInterval {
    fn next_delay(&self, _attempt: u32) -> Duration {
        self.delay
    }
}

/// Exponential backoff with configurable multiplier and optional cap.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    multiplier: f64,
    max_delay: Option<Duration>,
}

impl ExponentialBackoff {
    /// Creates an exponential backoff with the default multiplier of 2.0.
    pub fn new(initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            multiplier: 2.0,
            max_delay: None,
        }
    }

    /// Sets the multiplier for exponential growth.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets the maximum delay, capping exponential growth.
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    fn raw_delay(&self, attempt: u32) -> Duration {
        // Attempt 1 gets the initial delay unchanged.
        let exponent = attempt.saturating_sub(1);
        let factor = self.multiplier.powf(f64::from(exponent));
        let ceiling = self.max_delay.unwrap_or(Duration::MAX);
        // Cap before constructing the Duration: a long enough attempt
        // streak overflows Duration, and an unlimited streak must keep
        // producing delays rather than panic.
        let secs = self.initial_delay.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= ceiling.as_secs_f64() {
            return ceiling;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(ceiling)
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn next_delay(&self, attempt: u32) -> Duration {
        self.raw_delay(attempt)
    }
}

/// Exponential backoff with randomization to avoid reconnection storms
/// when many clients lose the same server at once.
#[derive(Debug, Clone)]
pub struct ExponentialRandomBackoff {
    base: ExponentialBackoff,
    randomization_factor: f64,
}

impl ExponentialRandomBackoff {
    /// Creates a randomized exponential backoff.
    ///
    /// `randomization_factor` is clamped to `0.0..=1.0`. A factor of 0.5
    /// spreads each delay between 50% and 150% of its computed value.
    pub fn new(initial_delay: Duration, randomization_factor: f64) -> Self {
        Self {
            base: ExponentialBackoff::new(initial_delay),
            randomization_factor: randomization_factor.clamp(0.0, 1.0),
        }
    }

    /// Sets the multiplier for exponential growth.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.base = self.base.multiplier(multiplier);
        self
    }

    /// Sets the maximum delay, capping exponential growth before jitter.
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.base = self.base.max_delay(max_delay);
        self
    }
}

impl IntervalFunction for ExponentialRandomBackoff {
    fn next_delay(&self, attempt: u32) -> Duration {
        use rand::Rng;
        let capped = self.base.raw_delay(attempt);
        let computed = capped.as_secs_f64();
        let delta = computed * self.randomization_factor;
        let jittered = rand::thread_rng().gen_range(computed - delta..=computed + delta);
        // Jitter above the cap can push past Duration's range.
        Duration::try_from_secs_f64(jittered.max(0.0)).unwrap_or(capped)
    }
}

/// Function-based interval for fully custom delay schedules.
pub struct FnInterval<F> {
    f: F,
}

impl<F> FnInterval<F>
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    /// Creates an interval from a closure mapping attempt number to delay.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IntervalFunction for FnInterval<F>
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    fn next_delay(&self, attempt: u32) -> Duration {
        (self.f)(attempt)
    }
}
