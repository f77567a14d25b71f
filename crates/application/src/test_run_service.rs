//! Test-run submission and status polling.
//!
//! A test run is a Result row plus one job handed to the external worker
//! queue. Hand-off is a single attempt; callers retry by submitting again.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use campus_core::{AppError, AppResult, Principal};
use campus_domain::{Action, EntityKind, ResultCreate, ResultStatus};

use crate::entity_service::EntityService;
use crate::interfaces::{CourseMemberInterface, ResultInterface};
use crate::query::StoredRecord;

/// Job description handed to the worker queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestJobDescriptor {
    /// Queue job identifier, also used as idempotency key.
    pub job_id: String,
    /// Result row the worker reports into.
    pub result_id: String,
    /// Course the submission belongs to.
    pub course_id: String,
    /// Submitting course membership.
    pub course_member_id: String,
    /// Repository holding the submission.
    pub repository_url: String,
    /// Commit or tag under test.
    pub version_identifier: String,
    /// Worker service that executes the tests.
    pub execution_backend: String,
}

/// Port for handing test jobs to the worker queue.
#[async_trait]
pub trait TestJobDispatcher: Send + Sync {
    /// Hands one job to the queue. Implementations make a single attempt.
    async fn dispatch(&self, job: &TestJobDescriptor) -> AppResult<()>;
}

/// Caller request to run tests against a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRunRequest {
    /// Submitting course membership.
    pub course_member_id: String,
    /// Worker service that executes the tests.
    pub execution_backend: String,
    /// Repository holding the submission.
    pub repository_url: String,
    /// Commit or tag under test.
    pub version_identifier: String,
}

impl TestRunRequest {
    /// Validates request invariants.
    pub fn validate(&self) -> AppResult<()> {
        for (field, value) in [
            ("course_member_id", &self.course_member_id),
            ("execution_backend", &self.execution_backend),
            ("repository_url", &self.repository_url),
            ("version_identifier", &self.version_identifier),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Outcome of a scheduled test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunReceipt {
    /// Created Result row.
    pub result_id: String,
    /// Queue job identifier.
    pub job_id: String,
    /// Status right after scheduling.
    pub status: ResultStatus,
}

/// Current state of a test run.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRunStatus {
    /// Result row.
    pub result_id: String,
    /// Current status.
    pub status: ResultStatus,
    /// Score once the run finished.
    pub score: Option<f64>,
}

/// Application service for test runs.
#[derive(Clone)]
pub struct TestRunService {
    entity_service: EntityService,
    dispatcher: Arc<dyn TestJobDispatcher>,
}

impl TestRunService {
    /// Creates a new test-run service.
    #[must_use]
    pub fn new(entity_service: EntityService, dispatcher: Arc<dyn TestJobDispatcher>) -> Self {
        Self {
            entity_service,
            dispatcher,
        }
    }

    /// Records a scheduled Result and hands its job to the queue.
    ///
    /// When the hand-off fails the Result is marked failed and the dispatch
    /// error is returned.
    pub async fn create_test_run(
        &self,
        principal: &Principal,
        request: &TestRunRequest,
    ) -> AppResult<TestRunReceipt> {
        request.validate()?;

        let member = self
            .entity_service
            .get::<CourseMemberInterface>(principal, &request.course_member_id)
            .await?;

        let job_id = Uuid::new_v4().to_string();
        let result = self
            .entity_service
            .create::<ResultInterface>(
                principal,
                &ResultCreate {
                    course_id: member.course_id.clone(),
                    course_member_id: member.id.clone(),
                    user_id: principal.user_id().to_owned(),
                    execution_backend: request.execution_backend.clone(),
                    repository_url: request.repository_url.clone(),
                    version_identifier: request.version_identifier.clone(),
                    job_id: job_id.clone(),
                    status: ResultStatus::Scheduled,
                },
            )
            .await?;

        let job = TestJobDescriptor {
            job_id: job_id.clone(),
            result_id: result.id.clone(),
            course_id: member.course_id,
            course_member_id: member.id,
            repository_url: request.repository_url.clone(),
            version_identifier: request.version_identifier.clone(),
            execution_backend: request.execution_backend.clone(),
        };

        if let Err(error) = self.dispatcher.dispatch(&job).await {
            warn!(
                result_id = %result.id,
                job_id = %job_id,
                %error,
                "test job dispatch failed"
            );
            self.mark_failed(principal, &result.id).await?;
            return Err(error);
        }

        info!(result_id = %result.id, job_id = %job_id, "test job dispatched");

        Ok(TestRunReceipt {
            result_id: result.id,
            job_id,
            status: result.status,
        })
    }

    /// Returns the current state of a test run visible to the principal.
    pub async fn status(
        &self,
        principal: &Principal,
        result_id: &str,
    ) -> AppResult<TestRunStatus> {
        let result = self
            .entity_service
            .get::<ResultInterface>(principal, result_id)
            .await?;

        Ok(TestRunStatus {
            result_id: result.id,
            status: result.status,
            score: result.score,
        })
    }

    async fn mark_failed(&self, principal: &Principal, result_id: &str) -> AppResult<()> {
        let scope = self
            .entity_service
            .authorization_service()
            .check_permissions(principal, EntityKind::Result, Action::Create)?;

        let mut changes = StoredRecord::new();
        changes.insert(
            "status".to_owned(),
            Value::String(ResultStatus::Failed.as_str().to_owned()),
        );

        self.entity_service
            .update_in_scope::<ResultInterface>(scope, result_id, changes)
            .await
            .map(|_| ())
    }
}
