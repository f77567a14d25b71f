use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Extension, Path, State};
use axum::http::StatusCode;
use campus_core::Principal;

use crate::dto::{LoginRequest, LoginResponse, PrincipalResponse, SetPasswordRequest};
use crate::error::ApiResult;
use crate::middleware::BearerToken;
use crate::state::AppState;

pub async fn login_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let session = state
        .auth_service
        .login(
            payload.username.as_str(),
            payload.password.as_str(),
            Some(peer.ip().to_string()),
        )
        .await?;

    Ok(Json(LoginResponse::from(session)))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
) -> ApiResult<StatusCode> {
    state.auth_service.logout(token.0.as_str()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(Extension(principal): Extension<Principal>) -> Json<PrincipalResponse> {
    Json(PrincipalResponse::from(&principal))
}

pub async fn set_password_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
    Json(payload): Json<SetPasswordRequest>,
) -> ApiResult<StatusCode> {
    state
        .auth_service
        .set_password(&principal, user_id.as_str(), payload.password.as_str())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
