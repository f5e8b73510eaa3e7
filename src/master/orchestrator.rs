use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::config::MasterConfig;
use crate::error::{CrackError, Result};
use crate::hash::Md5Digest;
use crate::master::cache::CrackedCache;
use crate::master::chunk::ChunkManager;
use crate::master::client::MinionClient;
use crate::master::job::{JobManager, JobResult};
use crate::master::output::OutputWriter;
use crate::master::registry::MinionRegistry;
use crate::master::scheduler::Scheduler;
use crate::scheme::{SchemeRegistry, DEFAULT_SCHEME};

/// Composition root of the master: owns the shared singletons and fans the
/// input hashes out over per-job scheduler tasks, at most
/// `MAX_CONCURRENT_JOBS` at a time.
#[derive(Clone)]
pub struct Orchestrator {
    config: MasterConfig,
    registry: Arc<MinionRegistry>,
    client: Arc<MinionClient>,
    jobs: Arc<JobManager>,
    schemes: Arc<SchemeRegistry>,
    output: Arc<OutputWriter>,
}

impl Orchestrator {
    pub fn new(config: MasterConfig) -> Result<Self> {
        if config.minion_urls.is_empty() {
            return Err(CrackError::Config {
                key: "MINION_URLS",
                value: String::new(),
            });
        }
        let registry = Arc::new(MinionRegistry::new(&config));
        let client = Arc::new(MinionClient::new(&config)?);
        let jobs = Arc::new(JobManager::new(Arc::new(CrackedCache::new())));
        let schemes = Arc::new(SchemeRegistry::builtin());
        let output = Arc::new(OutputWriter::new(config.output_file.clone()));
        Ok(Self {
            config,
            registry,
            client,
            jobs,
            schemes,
            output,
        })
    }

    /// Build an orchestrator over caller-provided parts. Used by tests to
    /// seed the cache or point the output somewhere else.
    pub fn with_parts(
        config: MasterConfig,
        registry: Arc<MinionRegistry>,
        client: Arc<MinionClient>,
        jobs: Arc<JobManager>,
        output: Arc<OutputWriter>,
    ) -> Self {
        Self {
            config,
            registry,
            client,
            jobs,
            schemes: Arc::new(SchemeRegistry::builtin()),
            output,
        }
    }

    pub fn output(&self) -> &OutputWriter {
        &self.output
    }

    /// Probe every minion's `/health` once, logging unreachable endpoints.
    /// Informational only: an endpoint that is down now may heal later.
    pub async fn probe_fleet(&self) {
        for endpoint in self.registry.all() {
            if self.client.health(&endpoint.url).await {
                tracing::info!(url = %endpoint.url, "Minion healthy");
            } else {
                tracing::warn!(url = %endpoint.url, "Minion unreachable at startup");
            }
        }
    }

    /// Process the raw input file contents to completion: one output record
    /// per hash line, blank lines skipped.
    pub async fn run(&self, input: &str) -> Result<()> {
        self.output.init().await?;

        let (valid, invalid) = parse_input(input);

        for raw in &invalid {
            let job_id = Uuid::new_v4();
            tracing::warn!(line = %raw, "Invalid hash in input");
            self.output
                .record(raw, &JobResult::InvalidInput, job_id)
                .await;
        }

        if valid.is_empty() {
            tracing::info!("No valid hashes to process");
            return Ok(());
        }

        tracing::info!(
            hashes = valid.len(),
            max_concurrent_jobs = self.config.max_concurrent_jobs,
            "Processing hashes"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_jobs));
        let mut tasks = JoinSet::new();
        for hash in valid {
            let orchestrator = self.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("job semaphore closed");
                orchestrator.process_hash(hash).await;
            });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(error) = joined {
                tracing::error!(error = %error, "Hash task failed");
            }
        }

        tracing::info!("All jobs completed");
        Ok(())
    }

    /// Crack one hash: serve it from the cache, or open a job and run the
    /// scheduler to completion.
    async fn process_hash(&self, hash: Md5Digest) {
        let Some(scheme) = self.schemes.get(DEFAULT_SCHEME) else {
            tracing::error!(scheme = DEFAULT_SCHEME, "Built-in scheme missing");
            return;
        };

        let mut job = self.jobs.create_job(hash, scheme.as_ref());
        if job.is_terminal() {
            // Cache hit: nothing to dispatch.
            self.record_job(&job).await;
            return;
        }

        let mut chunks = ChunkManager::plan(
            job.id,
            job.total_size,
            self.config.chunk_size,
            self.config.max_attempts,
        );
        let scheduler = Scheduler::new(
            self.registry.clone(),
            self.client.clone(),
            self.config.clone(),
        );
        scheduler.run_job(&mut job, &self.jobs, &mut chunks).await;
        self.record_job(&job).await;
    }

    async fn record_job(&self, job: &crate::master::job::Job) {
        let result = job.result.clone().unwrap_or(JobResult::Failed);
        self.output
            .record(&job.hash.to_string(), &result, job.id)
            .await;
    }
}

/// Split raw input into parsed hashes and invalid lines. Blank lines are
/// skipped; hashes are normalised to lowercase by the parse.
pub fn parse_input(input: &str) -> (Vec<Md5Digest>, Vec<String>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<Md5Digest>() {
            Ok(hash) => valid.push(hash),
            Err(_) => invalid.push(line.to_ascii_lowercase()),
        }
    }
    (valid, invalid)
}
