use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use uuid::Uuid;

use crate::config::MasterConfig;
use crate::master::chunk::{Chunk, ChunkManager, ReportOutcome};
use crate::master::client::MinionClient;
use crate::master::job::{Job, JobManager};
use crate::master::registry::{MinionEndpoint, MinionRegistry};
use crate::protocol::{CrackRequest, CrackResponse, ResultStatus};

/// Drives one job's chunks to completion across the minion fleet.
///
/// The per-job loop keeps as many chunks in flight as there are available
/// minions, drains completions through a single `JoinSet`, applies the
/// retry/cancel policy, and sleeps `NO_MINION_WAIT_TIME` whenever every
/// breaker is open. Multiple jobs run their own loops concurrently over the
/// same shared registry and client.
pub struct Scheduler {
    registry: Arc<MinionRegistry>,
    client: Arc<MinionClient>,
    config: MasterConfig,
}

/// Completion of one dispatched chunk.
struct Completion {
    chunk_id: Uuid,
    response: CrackResponse,
}

impl Scheduler {
    pub fn new(registry: Arc<MinionRegistry>, client: Arc<MinionClient>, config: MasterConfig) -> Self {
        Self {
            registry,
            client,
            config,
        }
    }

    /// Run `job` to a terminal state. The chunk plan and the job itself are
    /// owned by this call; shared state is limited to the registry, client
    /// and cache.
    pub async fn run_job(&self, job: &mut Job, jobs: &JobManager, chunks: &mut ChunkManager) {
        jobs.mark_running(job);

        let mut inflight: JoinSet<Completion> = JoinSet::new();
        // Task id -> chunk id, so a panicked dispatch can still be reported.
        let mut dispatched: HashMap<tokio::task::Id, Uuid> = HashMap::new();

        while !job.is_terminal() {
            self.fill_pool(job, chunks, &mut inflight, &mut dispatched);

            if inflight.is_empty() {
                if chunks.ready_count() == 0 {
                    // Nothing in flight and nothing left to dispatch.
                    self.finish_resolved(job, jobs, chunks);
                    break;
                }
                // Chunks are ready but every breaker is open.
                tracing::debug!(
                    job_id = %job.id,
                    wait = ?self.config.no_minion_wait_time,
                    "No minions available, waiting"
                );
                tokio::time::sleep(self.config.no_minion_wait_time).await;
                continue;
            }

            let Some(completion) = Self::next_completion(&mut inflight, &mut dispatched).await
            else {
                continue;
            };

            match completion.response.status {
                ResultStatus::Found => {
                    let Some(password) = completion.response.password.clone() else {
                        // FOUND without a password is a malformed result.
                        self.apply_error(job, jobs, chunks, completion.chunk_id);
                        continue;
                    };
                    chunks.report(completion.chunk_id, ResultStatus::Found);
                    if jobs.apply_found(job, password) {
                        self.broadcast_cancel(job.id);
                        Self::drain(&mut inflight, &mut dispatched, chunks).await;
                    }
                }
                ResultStatus::NotFound => {
                    chunks.report(completion.chunk_id, ResultStatus::NotFound);
                }
                ResultStatus::Cancelled => {
                    chunks.report(completion.chunk_id, ResultStatus::Cancelled);
                }
                ResultStatus::Error => {
                    self.apply_error(job, jobs, chunks, completion.chunk_id);
                }
                ResultStatus::InvalidInput => {
                    // The fleet rejected the request itself; retrying cannot
                    // help and the record surfaces immediately.
                    tracing::warn!(
                        job_id = %job.id,
                        chunk_id = %completion.chunk_id,
                        error = completion.response.error.as_deref().unwrap_or("invalid input"),
                        "Minion rejected chunk as invalid input"
                    );
                    jobs.apply_invalid(job);
                    inflight.abort_all();
                    Self::drain(&mut inflight, &mut dispatched, chunks).await;
                }
            }
        }
    }

    /// Dispatch ready chunks until the pool holds one request per available
    /// minion. A chunk taken without an endpoint to serve it goes back to
    /// `Ready` without consuming an attempt.
    fn fill_pool(
        &self,
        job: &Job,
        chunks: &mut ChunkManager,
        inflight: &mut JoinSet<Completion>,
        dispatched: &mut HashMap<tokio::task::Id, Uuid>,
    ) {
        while inflight.len() < self.registry.available_count() {
            let Some(chunk) = chunks.take_ready() else {
                break;
            };
            let Some(endpoint) = self.registry.next_available() else {
                chunks.requeue(chunk.id);
                break;
            };
            let task_id = self.dispatch(job, &chunk, endpoint, inflight);
            dispatched.insert(task_id, chunk.id);
        }
    }

    fn dispatch(
        &self,
        job: &Job,
        chunk: &Chunk,
        endpoint: Arc<MinionEndpoint>,
        inflight: &mut JoinSet<Completion>,
    ) -> tokio::task::Id {
        let client = self.client.clone();
        let request = CrackRequest {
            job_id: job.id,
            hash: job.hash.to_string(),
            scheme_name: job.scheme_name.clone(),
            lo: chunk.lo,
            hi: chunk.hi,
        };
        let chunk_id = chunk.id;
        tracing::debug!(
            job_id = %job.id,
            chunk_id = %chunk_id,
            url = %endpoint.url,
            lo = chunk.lo,
            hi = chunk.hi,
            "Dispatching chunk"
        );
        let handle = inflight.spawn(async move {
            let response = client.crack(&endpoint, &request).await;
            Completion { chunk_id, response }
        });
        handle.id()
    }

    /// Wait for the next completion. A panicked dispatch task is translated
    /// into an `ERROR` completion for its chunk.
    async fn next_completion(
        inflight: &mut JoinSet<Completion>,
        dispatched: &mut HashMap<tokio::task::Id, Uuid>,
    ) -> Option<Completion> {
        match inflight.join_next_with_id().await? {
            Ok((task_id, completion)) => {
                dispatched.remove(&task_id);
                Some(completion)
            }
            Err(join_error) => {
                let chunk_id = dispatched.remove(&join_error.id());
                if join_error.is_cancelled() {
                    return None;
                }
                tracing::error!(error = %join_error, "Dispatch task panicked");
                chunk_id.map(|chunk_id| Completion {
                    chunk_id,
                    response: CrackResponse {
                        status: ResultStatus::Error,
                        password: None,
                        job_id: Uuid::nil(),
                        scheme_name: String::new(),
                        error: Some(join_error.to_string()),
                    },
                })
            }
        }
    }

    fn apply_error(&self, job: &mut Job, jobs: &JobManager, chunks: &mut ChunkManager, chunk_id: Uuid) {
        if chunks.report(chunk_id, ResultStatus::Error) == ReportOutcome::Exhausted {
            jobs.apply_failed(job);
        }
    }

    /// All chunks resolved with no first-found and no exhaustion short
    /// circuit: decide the terminal state from the chunk plan.
    fn finish_resolved(&self, job: &mut Job, jobs: &JobManager, chunks: &ChunkManager) {
        if chunks.any_exhausted() {
            jobs.apply_failed(job);
        } else {
            // All chunks NOT_FOUND or CANCELLED. Cancelled-only still means
            // NOT_FOUND: cancellation implies another chunk won or the job
            // is already ending.
            jobs.apply_not_found(job);
        }
    }

    /// Fire `/cancel` at every endpoint in parallel, detached from the job
    /// loop. Best-effort: failures are logged by the client and never
    /// charged to breakers.
    fn broadcast_cancel(&self, job_id: Uuid) {
        let client = self.client.clone();
        let urls: Vec<String> = self
            .registry
            .all()
            .iter()
            .map(|endpoint| endpoint.url.clone())
            .collect();
        tokio::spawn(async move {
            tracing::info!(job_id = %job_id, minions = urls.len(), "Broadcasting cancellation");
            let mut cancels = JoinSet::new();
            for url in urls {
                let client = client.clone();
                cancels.spawn(async move { client.cancel(&url, job_id).await });
            }
            while cancels.join_next().await.is_some() {}
            tracing::debug!(job_id = %job_id, "Cancellation broadcast complete");
        });
    }

    /// Drain remaining in-flight dispatches without scheduling new work,
    /// recording their late outcomes.
    async fn drain(
        inflight: &mut JoinSet<Completion>,
        dispatched: &mut HashMap<tokio::task::Id, Uuid>,
        chunks: &mut ChunkManager,
    ) {
        while let Some(completion) = Self::next_completion(inflight, dispatched).await {
            chunks.report(completion.chunk_id, completion.response.status);
        }
        dispatched.clear();
    }
}
