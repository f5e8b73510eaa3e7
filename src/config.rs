use std::env;
use std::time::Duration;

use crate::error::{CrackError, Result};

/// Master-side configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct MasterConfig {
    pub chunk_size: u64,
    pub max_concurrent_jobs: usize,
    pub max_attempts: u32,
    pub minion_request_timeout: Duration,
    pub no_minion_wait_time: Duration,
    pub minion_failure_threshold: u32,
    pub minion_breaker_open: Duration,
    pub minion_urls: Vec<String>,
    pub output_file: String,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100_000,
            max_concurrent_jobs: 3,
            max_attempts: 3,
            minion_request_timeout: Duration::from_secs_f64(5.0),
            no_minion_wait_time: Duration::from_secs_f64(0.5),
            minion_failure_threshold: 3,
            minion_breaker_open: Duration::from_secs_f64(10.0),
            minion_urls: Vec::new(),
            output_file: "output.json".to_string(),
        }
    }
}

impl MasterConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults. Malformed values fail startup rather than being ignored.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            chunk_size: env_u64("CHUNK_SIZE", defaults.chunk_size)?,
            max_concurrent_jobs: env_usize("MAX_CONCURRENT_JOBS", defaults.max_concurrent_jobs)?,
            max_attempts: env_u32("MAX_ATTEMPTS", defaults.max_attempts)?,
            minion_request_timeout: env_duration(
                "MINION_REQUEST_TIMEOUT",
                defaults.minion_request_timeout,
            )?,
            no_minion_wait_time: env_duration("NO_MINION_WAIT_TIME", defaults.no_minion_wait_time)?,
            minion_failure_threshold: env_u32(
                "MINION_FAILURE_THRESHOLD",
                defaults.minion_failure_threshold,
            )?,
            minion_breaker_open: env_duration(
                "MINION_BREAKER_OPEN_SECONDS",
                defaults.minion_breaker_open,
            )?,
            minion_urls: env_urls("MINION_URLS"),
            output_file: env::var("OUTPUT_FILE").unwrap_or(defaults.output_file),
        })
    }
}

/// Minion-side configuration for the enumeration engine.
#[derive(Debug, Clone)]
pub struct MinionConfig {
    pub worker_threads: usize,
    pub cancellation_check_every: u64,
    pub subrange_min_size: u64,
}

impl Default for MinionConfig {
    fn default() -> Self {
        Self {
            worker_threads: 2,
            cancellation_check_every: 5_000,
            subrange_min_size: 1_000,
        }
    }
}

impl MinionConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            worker_threads: env_usize("WORKER_THREADS", defaults.worker_threads)?,
            cancellation_check_every: env_u64(
                "CANCELLATION_CHECK_EVERY",
                defaults.cancellation_check_every,
            )?,
            subrange_min_size: env_u64("MINION_SUBRANGE_MIN_SIZE", defaults.subrange_min_size)?,
        })
    }
}

fn env_u64(key: &'static str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| CrackError::Config { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn env_u32(key: &'static str, default: u32) -> Result<u32> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| CrackError::Config { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn env_usize(key: &'static str, default: usize) -> Result<usize> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| CrackError::Config { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Durations are given in (possibly fractional) seconds, e.g. `0.5`.
fn env_duration(key: &'static str, default: Duration) -> Result<Duration> {
    match env::var(key) {
        Ok(raw) => {
            let secs: f64 = raw
                .parse()
                .map_err(|_| CrackError::Config {
                    key,
                    value: raw.clone(),
                })?;
            if !secs.is_finite() || secs < 0.0 {
                return Err(CrackError::Config { key, value: raw });
            }
            Ok(Duration::from_secs_f64(secs))
        }
        Err(_) => Ok(default),
    }
}

/// Comma-separated URL list; blank entries are skipped.
fn env_urls(key: &'static str) -> Vec<String> {
    env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(|url| url.trim_end_matches('/').to_string())
        .collect()
}
