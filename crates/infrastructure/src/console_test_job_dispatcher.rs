//! Console job dispatcher for development. Logs jobs to tracing output.

use async_trait::async_trait;
use tracing::info;

use campus_application::{TestJobDescriptor, TestJobDispatcher};
use campus_core::AppResult;

/// Development dispatcher that logs each job instead of queueing it.
#[derive(Clone, Default)]
pub struct ConsoleTestJobDispatcher;

impl ConsoleTestJobDispatcher {
    /// Creates a new console dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TestJobDispatcher for ConsoleTestJobDispatcher {
    async fn dispatch(&self, job: &TestJobDescriptor) -> AppResult<()> {
        info!(
            job_id = %job.job_id,
            result_id = %job.result_id,
            course_id = %job.course_id,
            execution_backend = %job.execution_backend,
            repository_url = %job.repository_url,
            version_identifier = %job.version_identifier,
            "test job (console dispatcher)"
        );

        Ok(())
    }
}
