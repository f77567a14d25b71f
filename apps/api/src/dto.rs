//! Request and response payloads owned by the HTTP surface.
//!
//! Entity shapes are served as the canonical domain schemas; only the
//! payloads below are specific to the API.

use campus_application::{IssuedSession, TestRunReceipt, TestRunRequest, TestRunStatus};
use campus_core::{Claim, Principal};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    pub message: String,
}

/// Pagination parameters accepted by every list endpoint.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/list-window-query.ts"
)]
pub struct ListWindowQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

/// Incoming payload for username/password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued session returned by login.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-response.ts"
)]
pub struct LoginResponse {
    pub token: String,
    pub session_id: String,
    pub user_id: String,
}

impl From<IssuedSession> for LoginResponse {
    fn from(value: IssuedSession) -> Self {
        Self {
            token: value.token,
            session_id: value.session_id,
            user_id: value.user_id,
        }
    }
}

/// One claim held by the authenticated principal.
#[derive(Debug, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/claim-response.ts"
)]
pub struct ClaimResponse {
    pub claim_type: String,
    pub claim_value: String,
}

impl From<&Claim> for ClaimResponse {
    fn from(value: &Claim) -> Self {
        Self {
            claim_type: value.claim_type.clone(),
            claim_value: value.claim_value.clone(),
        }
    }
}

/// API representation of the authenticated principal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/principal-response.ts"
)]
pub struct PrincipalResponse {
    pub user_id: String,
    pub is_admin: bool,
    pub claims: Vec<ClaimResponse>,
}

impl From<&Principal> for PrincipalResponse {
    fn from(value: &Principal) -> Self {
        Self {
            user_id: value.user_id().to_owned(),
            is_admin: value.is_admin(),
            claims: value.claims().iter().map(ClaimResponse::from).collect(),
        }
    }
}

/// Incoming payload for setting a password.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/set-password-request.ts"
)]
pub struct SetPasswordRequest {
    pub password: String,
}

/// Incoming payload for scheduling a test run.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/test-run-request.ts"
)]
pub struct CreateTestRunRequest {
    pub course_member_id: String,
    pub execution_backend: String,
    pub repository_url: String,
    pub version_identifier: String,
}

impl From<CreateTestRunRequest> for TestRunRequest {
    fn from(value: CreateTestRunRequest) -> Self {
        Self {
            course_member_id: value.course_member_id,
            execution_backend: value.execution_backend,
            repository_url: value.repository_url,
            version_identifier: value.version_identifier,
        }
    }
}

/// Scheduled test run.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/test-run-response.ts"
)]
pub struct TestRunResponse {
    pub result_id: String,
    pub job_id: String,
    pub status: String,
}

impl From<TestRunReceipt> for TestRunResponse {
    fn from(value: TestRunReceipt) -> Self {
        Self {
            result_id: value.result_id,
            job_id: value.job_id,
            status: value.status.as_str().to_owned(),
        }
    }
}

/// Polled state of a test run.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/test-run-status-response.ts"
)]
pub struct TestRunStatusResponse {
    pub result_id: String,
    pub status: String,
    pub score: Option<f64>,
}

impl From<TestRunStatus> for TestRunStatusResponse {
    fn from(value: TestRunStatus) -> Self {
        Self {
            result_id: value.result_id,
            status: value.status.as_str().to_owned(),
            score: value.score,
        }
    }
}
