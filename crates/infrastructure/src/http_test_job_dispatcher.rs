use async_trait::async_trait;
use tracing::info;

use campus_application::{TestJobDescriptor, TestJobDispatcher};
use campus_core::{AppError, AppResult};

/// Hands test jobs to the worker queue over HTTP.
///
/// Each job is posted once to `<queue_url>/jobs` with the job id as
/// idempotency key. Request timeouts come from the supplied client.
pub struct HttpTestJobDispatcher {
    http_client: reqwest::Client,
    jobs_endpoint: String,
}

impl HttpTestJobDispatcher {
    /// Creates a dispatcher targeting the queue service at `queue_url`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, queue_url: &str) -> Self {
        Self {
            http_client,
            jobs_endpoint: format!("{}/jobs", queue_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl TestJobDispatcher for HttpTestJobDispatcher {
    async fn dispatch(&self, job: &TestJobDescriptor) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.jobs_endpoint.as_str())
            .header("Idempotency-Key", job.job_id.as_str())
            .json(job)
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "test job '{}' could not reach the queue: {error}",
                    job.job_id
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "queue rejected test job '{}' with status {status}: {body}",
                job.job_id
            )));
        }

        info!(
            job_id = %job.job_id,
            endpoint = %self.jobs_endpoint,
            "test job accepted by queue"
        );
        Ok(())
    }
}
