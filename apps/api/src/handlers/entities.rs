//! Generic CRUD handlers, instantiated once per entity interface.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use campus_application::{EntityInterface, ListWindow};
use campus_core::Principal;

use crate::dto::ListWindowQuery;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_handler<I: EntityInterface>(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(window): Query<ListWindowQuery>,
    Query(params): Query<I::Query>,
) -> ApiResult<Json<Vec<I::List>>> {
    let window = ListWindow::new(window.limit, window.skip)?;
    let rows = state
        .entity_service
        .list::<I>(&principal, Some(&params), window)
        .await?;

    Ok(Json(rows))
}

pub async fn get_handler<I: EntityInterface>(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<I::Get>> {
    let row = state
        .entity_service
        .get::<I>(&principal, id.as_str())
        .await?;

    Ok(Json(row))
}

pub async fn create_handler<I: EntityInterface>(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<I::Create>,
) -> ApiResult<(StatusCode, Json<I::Get>)> {
    let row = state
        .entity_service
        .create::<I>(&principal, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update_handler<I: EntityInterface>(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(payload): Json<I::Update>,
) -> ApiResult<Json<I::Get>> {
    let row = state
        .entity_service
        .update::<I>(&principal, id.as_str(), &payload)
        .await?;

    Ok(Json(row))
}

pub async fn delete_handler<I: EntityInterface>(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .entity_service
        .delete::<I>(&principal, id.as_str())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
