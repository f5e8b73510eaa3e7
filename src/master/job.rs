use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::hash::Md5Digest;
use crate::master::cache::CrackedCache;
use crate::scheme::PasswordScheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Terminal result of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    Found(String),
    NotFound,
    Failed,
    InvalidInput,
}

/// One target hash working its way through the system.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub hash: Md5Digest,
    pub scheme_name: String,
    pub total_size: u64,
    pub status: JobStatus,
    pub result: Option<JobResult>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Terminal jobs freeze their result; all further transitions are no-ops.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Done | JobStatus::Failed)
    }
}

/// Owns job creation and state transitions.
///
/// Transitions are idempotent: once a job reaches `Done` or `Failed`, late
/// results are logged and discarded. The first `FOUND` also writes the
/// cracked password through to the cache.
pub struct JobManager {
    cache: Arc<CrackedCache>,
}

impl JobManager {
    pub fn new(cache: Arc<CrackedCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &CrackedCache {
        &self.cache
    }

    /// Open a job for `hash`, consulting the cache first. A cache hit yields
    /// a job already in `Done`/`Found` state, with nothing to dispatch.
    pub fn create_job(&self, hash: Md5Digest, scheme: &dyn PasswordScheme) -> Job {
        let now = Utc::now();
        if let Some(entry) = self.cache.get(&hash) {
            tracing::info!(hash = %hash, password = %entry.password, "Cache hit");
            return Job {
                id: Uuid::new_v4(),
                hash,
                scheme_name: entry.scheme_name,
                total_size: 0,
                status: JobStatus::Done,
                result: Some(JobResult::Found(entry.password)),
                created_at: now,
                completed_at: Some(now),
            };
        }
        let job = Job {
            id: Uuid::new_v4(),
            hash,
            scheme_name: scheme.name().to_string(),
            total_size: scheme.size(),
            status: JobStatus::Pending,
            result: None,
            created_at: now,
            completed_at: None,
        };
        tracing::info!(
            job_id = %job.id,
            hash = %hash,
            scheme = %job.scheme_name,
            total_size = job.total_size,
            "Created job"
        );
        job
    }

    pub fn mark_running(&self, job: &mut Job) {
        if job.status == JobStatus::Pending {
            job.status = JobStatus::Running;
        }
    }

    /// Record the first `FOUND` result. Returns false (and leaves the job
    /// untouched) when the job is already terminal.
    pub fn apply_found(&self, job: &mut Job, password: String) -> bool {
        if job.is_terminal() {
            tracing::debug!(job_id = %job.id, "Ignoring late FOUND (job already terminal)");
            return false;
        }
        tracing::info!(job_id = %job.id, password = %password, "Password FOUND");
        self.cache
            .put(job.hash, password.clone(), job.scheme_name.clone());
        job.result = Some(JobResult::Found(password));
        self.finish(job, JobStatus::Done);
        true
    }

    /// Record that the whole space was searched without a match.
    pub fn apply_not_found(&self, job: &mut Job) {
        if job.is_terminal() {
            tracing::debug!(job_id = %job.id, "Ignoring late NOT_FOUND (job already terminal)");
            return;
        }
        job.result = Some(JobResult::NotFound);
        self.finish(job, JobStatus::Done);
    }

    /// Fail the job (a chunk exhausted its attempts budget).
    pub fn apply_failed(&self, job: &mut Job) {
        if job.is_terminal() {
            tracing::debug!(job_id = %job.id, "Ignoring late failure (job already terminal)");
            return;
        }
        tracing::warn!(job_id = %job.id, "Job failed");
        job.result = Some(JobResult::Failed);
        self.finish(job, JobStatus::Failed);
    }

    /// Terminate a job the fleet rejected as invalid (unknown scheme or
    /// out-of-range chunk). Not retried.
    pub fn apply_invalid(&self, job: &mut Job) {
        if job.is_terminal() {
            return;
        }
        tracing::warn!(job_id = %job.id, "Job rejected as invalid input");
        job.result = Some(JobResult::InvalidInput);
        self.finish(job, JobStatus::Done);
    }

    fn finish(&self, job: &mut Job, status: JobStatus) {
        job.status = status;
        job.completed_at = Some(Utc::now());
        tracing::info!(job_id = %job.id, status = %job.status, "Job finished");
    }
}
