//! Farm expense HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::expense::{CreateExpenseInput, Expense, ExpenseService, UpdateExpenseInput};
use crate::services::TenantResolver;
use crate::AppState;
use shared::types::{PaginatedResponse, Pagination};

/// Record an expense
pub async fn create_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateExpenseInput>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = ExpenseService::new(state.db);
    let expense = service.create_expense(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// List expenses
pub async fn list_expenses(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<Expense>>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = ExpenseService::new(state.db);
    let page = service.list_expenses(&ctx, pagination).await?;
    Ok(Json(page))
}

/// Get a specific expense
pub async fn get_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(expense_id): Path<Uuid>,
) -> AppResult<Json<Expense>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = ExpenseService::new(state.db);
    let expense = service.get_expense(&ctx, expense_id).await?;
    Ok(Json(expense))
}

/// Update an expense
pub async fn update_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(expense_id): Path<Uuid>,
    Json(input): Json<UpdateExpenseInput>,
) -> AppResult<Json<Expense>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = ExpenseService::new(state.db);
    let expense = service.update_expense(&ctx, expense_id, input).await?;
    Ok(Json(expense))
}

/// Delete an expense
pub async fn delete_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(expense_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = ExpenseService::new(state.db);
    service.delete_expense(&ctx, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
