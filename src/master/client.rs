use std::time::Duration;

use uuid::Uuid;

use crate::config::MasterConfig;
use crate::error::Result;
use crate::master::registry::MinionEndpoint;
use crate::protocol::{CancelRequest, CrackRequest, CrackResponse, ResultStatus};

const CANCEL_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP client for the minion fleet.
///
/// `crack` charges the endpoint's breaker itself: any 2xx with a well-formed
/// payload is a success (NOT_FOUND and CANCELLED included), everything else
/// (transport error, timeout, non-2xx, malformed body) is a failure and
/// surfaces as an `ERROR` outcome so the scheduler can retry the chunk.
pub struct MinionClient {
    http: reqwest::Client,
}

impl MinionClient {
    pub fn new(config: &MasterConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.minion_request_timeout)
            .build()?;
        Ok(Self { http })
    }

    pub async fn crack(&self, endpoint: &MinionEndpoint, request: &CrackRequest) -> CrackResponse {
        match self.try_crack(endpoint, request).await {
            Ok(response) => {
                endpoint.record_success();
                response
            }
            Err(error) => {
                tracing::error!(
                    url = %endpoint.url,
                    job_id = %request.job_id,
                    error = %error,
                    "Crack request failed"
                );
                endpoint.record_failure();
                CrackResponse::rejected(
                    request.job_id,
                    &request.scheme_name,
                    ResultStatus::Error,
                    error.to_string(),
                )
            }
        }
    }

    async fn try_crack(
        &self,
        endpoint: &MinionEndpoint,
        request: &CrackRequest,
    ) -> std::result::Result<CrackResponse, reqwest::Error> {
        let response = self
            .http
            .post(format!("{}/crack", endpoint.url))
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        response.json::<CrackResponse>().await
    }

    /// Best-effort cancellation. Failures are logged and never charged to the
    /// breaker: an unreachable minion simply keeps enumerating until its
    /// chunk ends.
    pub async fn cancel(&self, url: &str, job_id: Uuid) {
        let result = self
            .http
            .post(format!("{url}/cancel"))
            .timeout(CANCEL_TIMEOUT)
            .json(&CancelRequest { job_id })
            .send()
            .await
            .and_then(|response| response.error_for_status());
        match result {
            Ok(_) => tracing::debug!(url, job_id = %job_id, "Cancel request delivered"),
            Err(error) => {
                tracing::debug!(url, job_id = %job_id, error = %error, "Cancel request failed")
            }
        }
    }

    /// Probe a minion's `/health` endpoint.
    pub async fn health(&self, url: &str) -> bool {
        match self.http.get(format!("{url}/health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
