use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use uuid::Uuid;

/// Per-job cancellation flags.
///
/// The flag for a job is created on first touch and shared between the HTTP
/// handlers (which set it) and the worker threads (which poll it). Flags are
/// monotonic `false -> true` and live until the process exits; `/cancel` for
/// a job the minion never saw still records the flag, so a crack request
/// arriving afterwards observes the cancellation.
#[derive(Debug, Default)]
pub struct CancelRegistry {
    flags: RwLock<HashMap<Uuid, Arc<AtomicBool>>>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cancel flag for `job_id`, created unset if absent.
    pub fn flag(&self, job_id: Uuid) -> Arc<AtomicBool> {
        if let Some(flag) = self
            .flags
            .read()
            .expect("cancel registry lock poisoned")
            .get(&job_id)
        {
            return flag.clone();
        }
        let mut flags = self.flags.write().expect("cancel registry lock poisoned");
        flags
            .entry(job_id)
            .or_insert_with(|| Arc::new(AtomicBool::new(false)))
            .clone()
    }

    /// Mark `job_id` cancelled. Idempotent.
    pub fn cancel(&self, job_id: Uuid) {
        self.flag(job_id).store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self, job_id: Uuid) -> bool {
        self.flags
            .read()
            .expect("cancel registry lock poisoned")
            .get(&job_id)
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
