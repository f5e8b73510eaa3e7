use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::config::MinionConfig;
use crate::hash::Md5Digest;
use crate::scheme::PasswordScheme;

/// Aggregated outcome of enumerating one inclusive index range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    Found { index: u64, password: String },
    NotFound,
    Cancelled,
    Error(String),
}

/// Outcome of a single thread's subrange scan.
enum ScanOutcome {
    Found,
    NotFound,
    Cancelled,
    Error(String),
}

/// Enumerate `[lo, hi]` of `scheme` looking for the preimage of `target`.
///
/// The range is split into at most `worker_threads` contiguous subranges of
/// at least `subrange_min_size` indices each; a range too small for that
/// runs sequentially on the calling thread. Every `cancellation_check_every`
/// iterations each thread polls the job's cancel flag and a shared stop flag
/// raised by the first match.
///
/// Outcome precedence, strongest first: FOUND > ERROR > CANCELLED >
/// NOT_FOUND. A match recorded before a cancel arrives stays a FOUND; an
/// ERROR from any thread dominates benign outcomes so the master may retry
/// the chunk.
///
/// Callers validate the range against the scheme beforehand; this function
/// only burns CPU on MD5.
pub fn crack_range(
    scheme: &dyn PasswordScheme,
    target: &Md5Digest,
    lo: u64,
    hi: u64,
    cancel: &AtomicBool,
    config: &MinionConfig,
) -> WorkerOutcome {
    debug_assert!(lo <= hi && hi < scheme.size());

    let range_size = hi - lo + 1;
    let max_threads_by_size = (range_size / config.subrange_min_size.max(1)).max(1);
    let threads = (config.worker_threads.max(1) as u64).min(max_threads_by_size) as usize;

    let found: OnceLock<(u64, String)> = OnceLock::new();
    let stop = AtomicBool::new(false);
    let check_every = config.cancellation_check_every;

    let mut scans: Vec<ScanOutcome> = Vec::with_capacity(threads);
    if threads == 1 {
        scans.push(scan_subrange(
            scheme, target, lo, hi, cancel, &stop, &found, check_every,
        ));
    } else {
        let subrange_size = range_size.div_ceil(threads as u64);
        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(threads);
            let mut start = lo;
            while start <= hi {
                let end = (start + subrange_size - 1).min(hi);
                let found = &found;
                let stop = &stop;
                handles.push(scope.spawn(move || {
                    scan_subrange(scheme, target, start, end, cancel, stop, found, check_every)
                }));
                start = end + 1;
            }
            for handle in handles {
                scans.push(match handle.join() {
                    Ok(outcome) => outcome,
                    Err(_) => ScanOutcome::Error("worker thread panicked".to_string()),
                });
            }
        });
    }

    if let Some((index, password)) = found.into_inner() {
        tracing::info!(index, password = %password, "Password found");
        return WorkerOutcome::Found { index, password };
    }
    if let Some(message) = scans.into_iter().find_map(|scan| match scan {
        ScanOutcome::Error(message) => Some(message),
        _ => None,
    }) {
        return WorkerOutcome::Error(message);
    }
    if cancel.load(Ordering::Relaxed) {
        return WorkerOutcome::Cancelled;
    }
    WorkerOutcome::NotFound
}

/// Scan one contiguous subrange on the current thread.
#[allow(clippy::too_many_arguments)]
fn scan_subrange(
    scheme: &dyn PasswordScheme,
    target: &Md5Digest,
    start: u64,
    end: u64,
    cancel: &AtomicBool,
    stop: &AtomicBool,
    found: &OnceLock<(u64, String)>,
    check_every: u64,
) -> ScanOutcome {
    let mut since_check = 0u64;
    for index in start..=end {
        since_check += 1;
        if since_check >= check_every {
            since_check = 0;
            if cancel.load(Ordering::Relaxed) {
                tracing::debug!(index, "Subrange cancelled");
                return ScanOutcome::Cancelled;
            }
            if stop.load(Ordering::Relaxed) {
                // A sibling already found the password.
                return ScanOutcome::NotFound;
            }
        }
        let candidate = match scheme.at(index) {
            Ok(candidate) => candidate,
            Err(error) => return ScanOutcome::Error(error.to_string()),
        };
        if Md5Digest::of(&candidate) == *target {
            // First writer wins; later matches are suppressed.
            let _ = found.set((index, candidate));
            stop.store(true, Ordering::Relaxed);
            return ScanOutcome::Found;
        }
    }
    ScanOutcome::NotFound
}
