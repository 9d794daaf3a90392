//! Worker account HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::worker::{CreateWorkerInput, UpdateWorkerInput, Worker, WorkerService};
use crate::services::TenantResolver;
use crate::AppState;
use shared::types::{PaginatedResponse, Pagination};

/// Create a worker account
pub async fn create_worker(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateWorkerInput>,
) -> AppResult<(StatusCode, Json<Worker>)> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = WorkerService::new(state.db);
    let worker = service.create_worker(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(worker)))
}

/// List worker accounts
pub async fn list_workers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<Worker>>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = WorkerService::new(state.db);
    let page = service.list_workers(&ctx, pagination).await?;
    Ok(Json(page))
}

/// Get a specific worker
pub async fn get_worker(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(worker_id): Path<Uuid>,
) -> AppResult<Json<Worker>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = WorkerService::new(state.db);
    let worker = service.get_worker(&ctx, worker_id).await?;
    Ok(Json(worker))
}

/// Update a worker
pub async fn update_worker(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(worker_id): Path<Uuid>,
    Json(input): Json<UpdateWorkerInput>,
) -> AppResult<Json<Worker>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = WorkerService::new(state.db);
    let worker = service.update_worker(&ctx, worker_id, input).await?;
    Ok(Json(worker))
}

/// Delete a worker
pub async fn delete_worker(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(worker_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = WorkerService::new(state.db);
    service.delete_worker(&ctx, worker_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
