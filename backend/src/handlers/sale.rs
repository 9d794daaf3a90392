//! Milk sale HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::sale::{
    MilkSale, MilkSaleService, MilkSaleWithCustomer, RecordSaleInput, UpdateSaleInput,
};
use crate::services::TenantResolver;
use crate::AppState;
use shared::types::{PaginatedResponse, Pagination};

/// Record a milk sale
pub async fn record_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordSaleInput>,
) -> AppResult<(StatusCode, Json<MilkSale>)> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = MilkSaleService::new(state.db);
    let sale = service.record_sale(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// List sales for the tenant
pub async fn list_sales(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<MilkSaleWithCustomer>>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = MilkSaleService::new(state.db);
    let page = service.list_sales(&ctx, pagination).await?;
    Ok(Json(page))
}

/// Get a specific sale
pub async fn get_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<MilkSaleWithCustomer>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = MilkSaleService::new(state.db);
    let sale = service.get_sale(&ctx, sale_id).await?;
    Ok(Json(sale))
}

/// Update a sale
pub async fn update_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<UpdateSaleInput>,
) -> AppResult<Json<MilkSale>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = MilkSaleService::new(state.db);
    let sale = service.update_sale(&ctx, sale_id, input).await?;
    Ok(Json(sale))
}

/// Delete a sale (within the delete window)
pub async fn delete_sale(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = MilkSaleService::new(state.db);
    service.delete_sale(&ctx, sale_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Purchase history for a customer
pub async fn customer_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<MilkSaleWithCustomer>>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = MilkSaleService::new(state.db);
    let page = service.customer_history(&ctx, customer_id, pagination).await?;
    Ok(Json(page))
}
