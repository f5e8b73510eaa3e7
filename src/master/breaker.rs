use std::time::{Duration, Instant};

/// Per-minion circuit breaker.
///
/// Counts consecutive failures; at `threshold` the circuit opens for
/// `open_window`. The open state is evaluated lazily: the first `allow()`
/// after the window has elapsed resets the breaker to closed with a clean
/// failure count.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_count: u32,
    opened_until: Option<Instant>,
    threshold: u32,
    open_window: Duration,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, open_window: Duration) -> Self {
        Self {
            failure_count: 0,
            opened_until: None,
            threshold,
            open_window,
        }
    }

    /// Whether a request may be issued right now.
    pub fn allow(&mut self) -> bool {
        match self.opened_until {
            None => true,
            Some(until) => {
                if Instant::now() >= until {
                    tracing::info!("Circuit breaker closed (open window expired)");
                    self.failure_count = 0;
                    self.opened_until = None;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful request, resetting the failure count.
    pub fn record_success(&mut self) {
        if self.failure_count > 0 {
            tracing::debug!(
                failures = self.failure_count,
                "Circuit breaker: resetting failure count"
            );
        }
        self.failure_count = 0;
        self.opened_until = None;
    }

    /// Record a failed request; opens the circuit at the threshold.
    pub fn record_failure(&mut self) {
        self.failure_count += 1;
        if self.failure_count >= self.threshold {
            self.opened_until = Some(Instant::now() + self.open_window);
            tracing::warn!(
                failures = self.failure_count,
                open_for = ?self.open_window,
                "Circuit breaker opened"
            );
        }
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }
}
