use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::Result;
use crate::master::job::JobResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputStatus {
    Found,
    NotFound,
    InvalidInput,
    Failed,
}

impl std::fmt::Display for OutputStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputStatus::Found => write!(f, "FOUND"),
            OutputStatus::NotFound => write!(f, "NOT_FOUND"),
            OutputStatus::InvalidInput => write!(f, "INVALID_INPUT"),
            OutputStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// One entry of the output file, keyed by the input hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRecord {
    pub cracked_password: Option<String>,
    pub status: OutputStatus,
    pub job_id: Uuid,
}

impl OutputRecord {
    pub fn from_result(result: &JobResult, job_id: Uuid) -> Self {
        let (status, cracked_password) = match result {
            JobResult::Found(password) => (OutputStatus::Found, Some(password.clone())),
            JobResult::NotFound => (OutputStatus::NotFound, None),
            JobResult::Failed => (OutputStatus::Failed, None),
            JobResult::InvalidInput => (OutputStatus::InvalidInput, None),
        };
        Self {
            cracked_password,
            status,
            job_id,
        }
    }
}

/// Sink for per-hash results: a JSON object file plus one console line per
/// record.
///
/// The file is rewritten from the accumulated map after every record, so a
/// crash mid-run leaves every finished hash on disk. Concurrent jobs
/// serialise their writes through the mutex; write failures are logged and
/// do not take the run down.
pub struct OutputWriter {
    path: PathBuf,
    records: Mutex<BTreeMap<String, OutputRecord>>,
}

impl OutputWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the output file to an empty JSON object, creating parent
    /// directories as needed.
    pub async fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, b"{}\n").await?;
        Ok(())
    }

    /// Record one finished hash: print the console line and persist the
    /// updated output object.
    pub async fn record(&self, hash: &str, result: &JobResult, job_id: Uuid) {
        let record = OutputRecord::from_result(result, job_id);

        let line = match &record.cracked_password {
            Some(password) => format!("{hash} {password} {job_id}"),
            None => format!("{hash} {} {job_id}", record.status),
        };
        println!("{line}");

        let mut records = self.records.lock().await;
        records.insert(hash.to_string(), record);
        match serde_json::to_vec_pretty(&*records) {
            Ok(body) => {
                if let Err(error) = tokio::fs::write(&self.path, body).await {
                    tracing::error!(path = %self.path.display(), error = %error, "Failed to write output file");
                }
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to serialise output records");
            }
        }
    }
}
