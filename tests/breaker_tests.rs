use std::time::Duration;

use crackfleet::master::breaker::CircuitBreaker;
use crackfleet::master::registry::MinionRegistry;

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|url| url.to_string()).collect()
}

#[test]
fn test_breaker_starts_closed() {
    let mut breaker = CircuitBreaker::new(3, Duration::from_secs(10));
    assert!(breaker.allow());
    assert_eq!(breaker.failure_count(), 0);
}

#[test]
fn test_breaker_stays_closed_below_threshold() {
    let mut breaker = CircuitBreaker::new(3, Duration::from_secs(10));
    breaker.record_failure();
    breaker.record_failure();
    assert!(breaker.allow());
    assert_eq!(breaker.failure_count(), 2);
}

#[test]
fn test_breaker_opens_at_threshold() {
    let mut breaker = CircuitBreaker::new(3, Duration::from_secs(10));
    for _ in 0..3 {
        breaker.record_failure();
    }
    assert!(!breaker.allow());
}

#[test]
fn test_success_resets_failure_count() {
    let mut breaker = CircuitBreaker::new(3, Duration::from_secs(10));
    breaker.record_failure();
    breaker.record_failure();
    breaker.record_success();
    assert_eq!(breaker.failure_count(), 0);

    // Two more failures after the reset still leave the circuit closed.
    breaker.record_failure();
    breaker.record_failure();
    assert!(breaker.allow());
}

#[test]
fn test_breaker_closes_after_open_window() {
    let mut breaker = CircuitBreaker::new(1, Duration::from_millis(50));
    breaker.record_failure();
    assert!(!breaker.allow());

    std::thread::sleep(Duration::from_millis(80));
    assert!(breaker.allow());
    // The lazy reset also clears the failure count.
    assert_eq!(breaker.failure_count(), 0);
}

#[test]
fn test_registry_round_robin_order() {
    let registry = MinionRegistry::with_urls(
        &urls(&["http://a:8000", "http://b:8000", "http://c:8000"]),
        3,
        Duration::from_secs(10),
    );
    let picks: Vec<String> = (0..4)
        .map(|_| registry.next_available().unwrap().url.clone())
        .collect();
    assert_eq!(
        picks,
        vec!["http://a:8000", "http://b:8000", "http://c:8000", "http://a:8000"]
    );
}

#[test]
fn test_registry_skips_open_breakers() {
    let registry = MinionRegistry::with_urls(
        &urls(&["http://a:8000", "http://b:8000", "http://c:8000"]),
        3,
        Duration::from_secs(10),
    );
    let b = registry
        .all()
        .iter()
        .find(|e| e.url == "http://b:8000")
        .unwrap()
        .clone();
    for _ in 0..3 {
        b.record_failure();
    }

    assert_eq!(registry.available_count(), 2);
    let picks: Vec<String> = (0..4)
        .map(|_| registry.next_available().unwrap().url.clone())
        .collect();
    assert!(picks.iter().all(|url| url != "http://b:8000"));
}

#[test]
fn test_registry_none_when_all_open() {
    let registry = MinionRegistry::with_urls(
        &urls(&["http://a:8000", "http://b:8000"]),
        1,
        Duration::from_secs(10),
    );
    for endpoint in registry.all() {
        endpoint.record_failure();
    }
    assert_eq!(registry.available_count(), 0);
    assert!(registry.next_available().is_none());
}

#[test]
fn test_registry_empty_yields_none() {
    let registry = MinionRegistry::with_urls(&[], 3, Duration::from_secs(10));
    assert!(registry.next_available().is_none());
    assert!(registry.is_empty());
}

#[test]
fn test_registry_endpoint_recovers_after_window() {
    let registry = MinionRegistry::with_urls(&urls(&["http://a:8000"]), 1, Duration::from_millis(50));
    registry.all()[0].record_failure();
    assert!(registry.next_available().is_none());

    std::thread::sleep(Duration::from_millis(80));
    assert!(registry.next_available().is_some());
}
