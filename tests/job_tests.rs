use std::sync::Arc;

use crackfleet::hash::Md5Digest;
use crackfleet::master::cache::CrackedCache;
use crackfleet::master::job::{JobManager, JobResult, JobStatus};
use crackfleet::scheme::Phone05xScheme;

const PASSWORD_HASH: &str = "5f4dcc3b5aa765d61d8327deb882cf99"; // md5("password")

fn manager() -> JobManager {
    JobManager::new(Arc::new(CrackedCache::new()))
}

fn digest(hex: &str) -> Md5Digest {
    hex.parse().unwrap()
}

#[test]
fn test_create_job_pending_with_scheme_space() {
    let jobs = manager();
    let job = jobs.create_job(digest(PASSWORD_HASH), &Phone05xScheme);
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.total_size, 100_000_000);
    assert_eq!(job.scheme_name, "phone-05x");
    assert!(job.result.is_none());
    assert!(!job.is_terminal());
}

#[test]
fn test_cache_hit_synthesises_done_job() {
    let cache = Arc::new(CrackedCache::new());
    cache.put(digest(PASSWORD_HASH), "password".to_string(), "phone-05x".to_string());
    let jobs = JobManager::new(cache);

    let job = jobs.create_job(digest(PASSWORD_HASH), &Phone05xScheme);
    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(job.result, Some(JobResult::Found("password".to_string())));
    assert!(job.is_terminal());
    assert_eq!(job.total_size, 0);
}

#[test]
fn test_first_found_wins() {
    let jobs = manager();
    let mut job = jobs.create_job(digest(PASSWORD_HASH), &Phone05xScheme);
    jobs.mark_running(&mut job);

    assert!(jobs.apply_found(&mut job, "050-0000005".to_string()));
    assert!(!jobs.apply_found(&mut job, "050-9999999".to_string()));
    assert_eq!(
        job.result,
        Some(JobResult::Found("050-0000005".to_string()))
    );
    assert_eq!(job.status, JobStatus::Done);
}

#[test]
fn test_terminal_job_ignores_late_results() {
    let jobs = manager();
    let mut job = jobs.create_job(digest(PASSWORD_HASH), &Phone05xScheme);
    jobs.apply_not_found(&mut job);
    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(job.result, Some(JobResult::NotFound));

    // Every later transition is a no-op.
    jobs.apply_failed(&mut job);
    assert!(!jobs.apply_found(&mut job, "050-0000005".to_string()));
    jobs.apply_invalid(&mut job);
    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(job.result, Some(JobResult::NotFound));
}

#[test]
fn test_failed_job_is_frozen() {
    let jobs = manager();
    let mut job = jobs.create_job(digest(PASSWORD_HASH), &Phone05xScheme);
    jobs.apply_failed(&mut job);
    assert_eq!(job.status, JobStatus::Failed);

    assert!(!jobs.apply_found(&mut job, "050-0000005".to_string()));
    assert_eq!(job.result, Some(JobResult::Failed));
}

#[test]
fn test_found_writes_through_to_cache() {
    let cache = Arc::new(CrackedCache::new());
    let jobs = JobManager::new(cache.clone());
    let mut job = jobs.create_job(digest(PASSWORD_HASH), &Phone05xScheme);
    jobs.apply_found(&mut job, "password".to_string());

    let entry = cache.get(&digest(PASSWORD_HASH)).expect("cached after FOUND");
    assert_eq!(entry.password, "password");
    assert_eq!(entry.scheme_name, "phone-05x");

    // The next job for the same hash is served from the cache.
    let second = jobs.create_job(digest(PASSWORD_HASH), &Phone05xScheme);
    assert!(second.is_terminal());
}

#[test]
fn test_not_found_is_not_cached() {
    let cache = Arc::new(CrackedCache::new());
    let jobs = JobManager::new(cache.clone());
    let mut job = jobs.create_job(digest(PASSWORD_HASH), &Phone05xScheme);
    jobs.apply_not_found(&mut job);
    assert!(cache.get(&digest(PASSWORD_HASH)).is_none());
}

#[test]
fn test_cache_entries_are_monotonic() {
    let cache = CrackedCache::new();
    cache.put(digest(PASSWORD_HASH), "password".to_string(), "phone-05x".to_string());
    cache.put(digest(PASSWORD_HASH), "different".to_string(), "phone-05x".to_string());

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&digest(PASSWORD_HASH)).unwrap().password, "password");
}

#[test]
fn test_cache_normalises_through_digest_parse() {
    let cache = CrackedCache::new();
    cache.put(
        "5F4DCC3B5AA765D61D8327DEB882CF99".parse().unwrap(),
        "password".to_string(),
        "phone-05x".to_string(),
    );
    assert!(cache.get(&digest(PASSWORD_HASH)).is_some());
}
