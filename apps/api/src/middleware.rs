use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use campus_core::AppError;

use crate::error::ApiResult;
use crate::state::AppState;

/// Raw bearer token of the authenticated request.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Resolves `Authorization: Bearer <token>` into a principal extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers())?;
    let principal = state.auth_service.resolve_principal(&token).await?;

    request.extensions_mut().insert(principal);
    request.extensions_mut().insert(BearerToken(token));
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_owned()))?;

    Ok(token.to_owned())
}
