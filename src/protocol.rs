//! Wire types shared by the master's minion client and the minion HTTP API.
//!
//! All payloads are JSON. `/crack` always answers HTTP 200 with a typed
//! [`ResultStatus`]; non-2xx responses are reserved for transport-level
//! failures and are treated by the master as `ERROR`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal status of one crack request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    Found,
    NotFound,
    Cancelled,
    Error,
    InvalidInput,
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultStatus::Found => write!(f, "FOUND"),
            ResultStatus::NotFound => write!(f, "NOT_FOUND"),
            ResultStatus::Cancelled => write!(f, "CANCELLED"),
            ResultStatus::Error => write!(f, "ERROR"),
            ResultStatus::InvalidInput => write!(f, "INVALID_INPUT"),
        }
    }
}

/// Body of `POST /crack`. The range is inclusive on both ends.
///
/// `hash` stays a raw string here: format validation is the minion's job and
/// a malformed hash must produce an `INVALID_INPUT` payload, not a 4xx.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrackRequest {
    pub job_id: Uuid,
    pub hash: String,
    pub scheme_name: String,
    pub lo: u64,
    pub hi: u64,
}

/// Body of the `POST /crack` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrackResponse {
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub job_id: Uuid,
    pub scheme_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrackResponse {
    pub fn found(job_id: Uuid, scheme_name: &str, password: String) -> Self {
        Self {
            status: ResultStatus::Found,
            password: Some(password),
            job_id,
            scheme_name: scheme_name.to_string(),
            error: None,
        }
    }

    pub fn status_only(status: ResultStatus, job_id: Uuid, scheme_name: &str) -> Self {
        Self {
            status,
            password: None,
            job_id,
            scheme_name: scheme_name.to_string(),
            error: None,
        }
    }

    pub fn rejected(job_id: Uuid, scheme_name: &str, status: ResultStatus, error: String) -> Self {
        Self {
            status,
            password: None,
            job_id,
            scheme_name: scheme_name.to_string(),
            error: Some(error),
        }
    }
}

/// Body of `POST /cancel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    pub job_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of `GET /status/{job_id}`: the minion-local cancel flag, for debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub cancelled: bool,
}
