//! Customer account HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::customer::{
    CreateCustomerInput, Customer, CustomerService, UpdateCustomerInput,
};
use crate::services::TenantResolver;
use crate::AppState;
use shared::types::{PaginatedResponse, Pagination};

/// Create a customer account
pub async fn create_customer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCustomerInput>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = CustomerService::new(state.db);
    let customer = service.create_customer(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// List customers
pub async fn list_customers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<Customer>>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = CustomerService::new(state.db);
    let page = service.list_customers(&ctx, pagination).await?;
    Ok(Json(page))
}

/// Get a specific customer
pub async fn get_customer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = CustomerService::new(state.db);
    let customer = service.get_customer(&ctx, customer_id).await?;
    Ok(Json(customer))
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<UpdateCustomerInput>,
) -> AppResult<Json<Customer>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = CustomerService::new(state.db);
    let customer = service.update_customer(&ctx, customer_id, input).await?;
    Ok(Json(customer))
}

/// Delete a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = CustomerService::new(state.db);
    service.delete_customer(&ctx, customer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
