//! Test-run result shapes.

use std::str::FromStr;

use campus_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::require_non_empty;

/// Lifecycle state of a dispatched test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// Job handed to the queue.
    Scheduled,
    /// Job accepted by a worker but not started.
    Pending,
    /// Worker is executing the tests.
    Running,
    /// Tests completed and a score was recorded.
    Finished,
    /// Dispatch or execution failed.
    Failed,
    /// Job was cancelled before completion.
    Cancelled,
}

impl ResultStatus {
    /// Returns the storage string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether no further transitions are expected.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Cancelled)
    }
}

impl FromStr for ResultStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "scheduled" => Ok(Self::Scheduled),
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "finished" => Ok(Self::Finished),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::Validation(format!(
                "unknown result status '{value}'"
            ))),
        }
    }
}

/// Payload for recording a new test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultCreate {
    /// Course the submission belongs to.
    pub course_id: String,
    /// Submitting course membership.
    pub course_member_id: String,
    /// Submitting user.
    pub user_id: String,
    /// Worker service that executes the tests.
    pub execution_backend: String,
    /// Repository holding the submission.
    pub repository_url: String,
    /// Commit or tag under test.
    pub version_identifier: String,
    /// Queue job identifier.
    pub job_id: String,
    /// Initial status.
    pub status: ResultStatus,
}

impl ResultCreate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        require_non_empty("course_id", &self.course_id)?;
        require_non_empty("course_member_id", &self.course_member_id)?;
        require_non_empty("user_id", &self.user_id)?;
        require_non_empty("execution_backend", &self.execution_backend)?;
        require_non_empty("repository_url", &self.repository_url)?;
        require_non_empty("version_identifier", &self.version_identifier)?;
        require_non_empty("job_id", &self.job_id)
    }
}

/// Detail shape of a test-run result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultGet {
    /// Stable result identifier.
    pub id: String,
    /// Course the submission belongs to.
    pub course_id: String,
    /// Submitting course membership.
    pub course_member_id: String,
    /// Submitting user.
    pub user_id: String,
    /// Worker service that executes the tests.
    pub execution_backend: String,
    /// Repository holding the submission.
    pub repository_url: String,
    /// Commit or tag under test.
    pub version_identifier: String,
    /// Queue job identifier.
    pub job_id: String,
    /// Current status.
    pub status: ResultStatus,
    /// Score reported by the worker.
    pub score: Option<f64>,
    /// Structured report returned by the worker.
    pub result_json: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Listing shape of a test-run result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultList {
    /// Stable result identifier.
    pub id: String,
    /// Submitting course membership.
    pub course_member_id: String,
    /// Current status.
    pub status: ResultStatus,
    /// Score reported by the worker.
    pub score: Option<f64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Allow-listed result mutations reported by workers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultUpdate {
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ResultStatus>,
    /// Score reported by the worker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Structured report returned by the worker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_json: Option<Value>,
}

impl ResultUpdate {
    /// Validates payload invariants.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(score) = self.score {
            if !score.is_finite() || !(0.0..=1.0).contains(&score) {
                return Err(AppError::Validation(
                    "result score must be a finite value between 0 and 1".to_owned(),
                ));
            }
        }
        Ok(())
    }
}

/// Filter parameters for result searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultQuery {
    /// Exact result id.
    pub id: Option<String>,
    /// Exact course id.
    pub course_id: Option<String>,
    /// Exact course membership id.
    pub course_member_id: Option<String>,
    /// Exact submitting user id.
    pub user_id: Option<String>,
    /// Exact status.
    pub status: Option<ResultStatus>,
    /// Exact queue job id.
    pub job_id: Option<String>,
    /// Exact version identifier.
    pub version_identifier: Option<String>,
}
