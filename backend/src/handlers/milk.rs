//! Milk production and stock HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::milk::{
    AddMilkRecordInput, MilkRecord, MilkRecordService, MilkRecordWithAnimal, UpdateMilkRecordInput,
};
use crate::services::{StockService, TenantResolver};
use crate::AppState;
use shared::types::{PaginatedResponse, Pagination};

/// Record a day's milk yield
pub async fn add_record(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AddMilkRecordInput>,
) -> AppResult<(StatusCode, Json<MilkRecord>)> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = MilkRecordService::new(state.db);
    let record = service.add_record(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// List production records
pub async fn list_records(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<MilkRecordWithAnimal>>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = MilkRecordService::new(state.db);
    let page = service.list_records(&ctx, pagination).await?;
    Ok(Json(page))
}

/// Get a specific production record
pub async fn get_record(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(record_id): Path<Uuid>,
) -> AppResult<Json<MilkRecordWithAnimal>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = MilkRecordService::new(state.db);
    let record = service.get_record(&ctx, record_id).await?;
    Ok(Json(record))
}

/// Update a production record
pub async fn update_record(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(record_id): Path<Uuid>,
    Json(input): Json<UpdateMilkRecordInput>,
) -> AppResult<Json<MilkRecord>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = MilkRecordService::new(state.db);
    let record = service.update_record(&ctx, record_id, input).await?;
    Ok(Json(record))
}

/// Delete a production record
pub async fn delete_record(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(record_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = MilkRecordService::new(state.db);
    service.delete_record(&ctx, record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current stock balance for the tenant
pub async fn get_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Value>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    ctx.require_staff()?;
    let service = StockService::new(state.db);
    let total_milk = service.get_stock(ctx.tenant_id).await?;
    Ok(Json(json!({ "total_milk": total_milk })))
}
