use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use campus_application::TestRunRequest;
use campus_core::Principal;

use crate::dto::{CreateTestRunRequest, TestRunResponse, TestRunStatusResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_test_run_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateTestRunRequest>,
) -> ApiResult<(StatusCode, Json<TestRunResponse>)> {
    let request = TestRunRequest::from(payload);
    let receipt = state
        .test_run_service
        .create_test_run(&principal, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(TestRunResponse::from(receipt))))
}

pub async fn test_run_status_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(result_id): Path<String>,
) -> ApiResult<Json<TestRunStatusResponse>> {
    let status = state
        .test_run_service
        .status(&principal, result_id.as_str())
        .await?;

    Ok(Json(TestRunStatusResponse::from(status)))
}
