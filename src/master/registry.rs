use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::MasterConfig;
use crate::master::breaker::CircuitBreaker;

/// One minion node: its base URL and the breaker guarding it.
#[derive(Debug)]
pub struct MinionEndpoint {
    pub url: String,
    breaker: Mutex<CircuitBreaker>,
}

impl MinionEndpoint {
    fn new(url: String, threshold: u32, open_window: Duration) -> Self {
        Self {
            url,
            breaker: Mutex::new(CircuitBreaker::new(threshold, open_window)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.breaker.lock().expect("breaker lock poisoned").allow()
    }

    pub fn record_success(&self) {
        self.breaker
            .lock()
            .expect("breaker lock poisoned")
            .record_success();
    }

    pub fn record_failure(&self) {
        self.breaker
            .lock()
            .expect("breaker lock poisoned")
            .record_failure();
    }
}

/// Static fleet of minion endpoints with round-robin selection.
///
/// Shared across every job's scheduler task; the cursor is a process-wide
/// atomic so concurrent jobs spread their dispatches over the fleet.
#[derive(Debug)]
pub struct MinionRegistry {
    endpoints: Vec<Arc<MinionEndpoint>>,
    cursor: AtomicUsize,
}

impl MinionRegistry {
    pub fn new(config: &MasterConfig) -> Self {
        Self::with_urls(
            &config.minion_urls,
            config.minion_failure_threshold,
            config.minion_breaker_open,
        )
    }

    pub fn with_urls(urls: &[String], threshold: u32, open_window: Duration) -> Self {
        let endpoints = urls
            .iter()
            .map(|url| Arc::new(MinionEndpoint::new(url.clone(), threshold, open_window)))
            .collect();
        Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Next endpoint whose breaker admits a request, in stable round-robin
    /// order. `None` only when every breaker is open.
    pub fn next_available(&self) -> Option<Arc<MinionEndpoint>> {
        if self.endpoints.is_empty() {
            return None;
        }
        for _ in 0..self.endpoints.len() {
            let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.endpoints.len();
            let endpoint = &self.endpoints[index];
            if endpoint.is_available() {
                tracing::debug!(url = %endpoint.url, "Picked minion (round-robin)");
                return Some(endpoint.clone());
            }
        }
        tracing::debug!("All minions unavailable (circuit breakers open)");
        None
    }

    /// Number of endpoints currently admitting requests.
    pub fn available_count(&self) -> usize {
        self.endpoints.iter().filter(|e| e.is_available()).count()
    }

    /// Every endpoint, regardless of breaker state.
    pub fn all(&self) -> &[Arc<MinionEndpoint>] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
