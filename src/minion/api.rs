//! Minion HTTP surface: a thin axum adapter over the worker and the
//! cancellation registry.
//!
//! `/crack` always answers 200 with a typed payload; INVALID_INPUT covers a
//! malformed hash, an unknown scheme, and an out-of-bounds range. Transport
//! failures are the master's signal to charge the breaker, so the handler
//! never maps worker problems onto HTTP status codes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::MinionConfig;
use crate::error::{CrackError, Result};
use crate::hash::Md5Digest;
use crate::minion::cancellation::CancelRegistry;
use crate::minion::worker::{crack_range, WorkerOutcome};
use crate::protocol::{
    CancelRequest, CancelResponse, CrackRequest, CrackResponse, HealthResponse, JobStatusResponse,
    ResultStatus,
};
use crate::scheme::SchemeRegistry;

#[derive(Clone)]
pub struct MinionState {
    pub cancels: Arc<CancelRegistry>,
    pub schemes: Arc<SchemeRegistry>,
    pub config: Arc<MinionConfig>,
}

impl MinionState {
    pub fn new(config: MinionConfig) -> Self {
        Self {
            cancels: Arc::new(CancelRegistry::new()),
            schemes: Arc::new(SchemeRegistry::builtin()),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: MinionState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/crack", post(crack_handler))
        .route("/cancel", post(cancel_handler))
        .route("/status/{job_id}", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the shutdown token fires.
pub async fn serve(addr: SocketAddr, state: MinionState, shutdown: CancellationToken) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Minion listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn crack_handler(
    State(state): State<MinionState>,
    Json(request): Json<CrackRequest>,
) -> Json<CrackResponse> {
    tracing::info!(
        job_id = %request.job_id,
        scheme = %request.scheme_name,
        lo = request.lo,
        hi = request.hi,
        "Received crack request"
    );

    let target: Md5Digest = match request.hash.parse() {
        Ok(digest) => digest,
        Err(error) => {
            return Json(CrackResponse::rejected(
                request.job_id,
                &request.scheme_name,
                ResultStatus::InvalidInput,
                error.to_string(),
            ));
        }
    };

    let Some(scheme) = state.schemes.get(&request.scheme_name) else {
        return Json(CrackResponse::rejected(
            request.job_id,
            &request.scheme_name,
            ResultStatus::InvalidInput,
            CrackError::UnknownScheme(request.scheme_name.clone()).to_string(),
        ));
    };

    if request.lo > request.hi || request.hi >= scheme.size() {
        return Json(CrackResponse::rejected(
            request.job_id,
            &request.scheme_name,
            ResultStatus::InvalidInput,
            CrackError::InvalidRange {
                lo: request.lo,
                hi: request.hi,
                size: scheme.size(),
            }
            .to_string(),
        ));
    }

    let cancel = state.cancels.flag(request.job_id);
    let config = state.config.clone();
    let (job_id, scheme_name) = (request.job_id, request.scheme_name.clone());
    let (lo, hi) = (request.lo, request.hi);

    // The enumeration is pure CPU; run it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || {
        crack_range(scheme.as_ref(), &target, lo, hi, &cancel, &config)
    })
    .await;

    let response = match outcome {
        Ok(WorkerOutcome::Found { password, .. }) => {
            CrackResponse::found(job_id, &scheme_name, password)
        }
        Ok(WorkerOutcome::NotFound) => {
            CrackResponse::status_only(ResultStatus::NotFound, job_id, &scheme_name)
        }
        Ok(WorkerOutcome::Cancelled) => {
            CrackResponse::status_only(ResultStatus::Cancelled, job_id, &scheme_name)
        }
        Ok(WorkerOutcome::Error(message)) => {
            tracing::error!(job_id = %job_id, error = %message, "Worker error");
            CrackResponse::rejected(job_id, &scheme_name, ResultStatus::Error, message)
        }
        Err(join_error) => {
            tracing::error!(job_id = %job_id, error = %join_error, "Worker task failed");
            CrackResponse::rejected(
                job_id,
                &scheme_name,
                ResultStatus::Error,
                join_error.to_string(),
            )
        }
    };

    tracing::info!(job_id = %job_id, status = %response.status, "Crack request finished");
    Json(response)
}

/// Idempotent: sets the flag even when no crack for that job has arrived
/// yet, so late dispatches short-circuit immediately.
pub async fn cancel_handler(
    State(state): State<MinionState>,
    Json(request): Json<CancelRequest>,
) -> Json<CancelResponse> {
    state.cancels.cancel(request.job_id);
    tracing::info!(job_id = %request.job_id, "Cancellation requested");
    Json(CancelResponse { ok: true })
}

pub async fn status_handler(
    State(state): State<MinionState>,
    Path(job_id): Path<Uuid>,
) -> Json<JobStatusResponse> {
    Json(JobStatusResponse {
        job_id,
        cancelled: state.cancels.is_cancelled(job_id),
    })
}
