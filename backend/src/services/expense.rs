//! Farm expense service
//!
//! Tenant-scoped expense tracking (feed, veterinary, equipment, ...).
//! Expenses are bookkeeping only and never touch the milk stock ledger.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::tenant::TenantContext;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_price;

/// Farm expense service
#[derive(Clone)]
pub struct ExpenseService {
    db: PgPool,
}

/// A recorded farm expense
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub category: String,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for recording an expense
#[derive(Debug, Deserialize)]
pub struct CreateExpenseInput {
    pub category: String,
    pub amount: Decimal,
    /// Defaults to the current UTC calendar day
    pub expense_date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// Input for updating an expense; omitted fields keep their stored values
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseInput {
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub expense_date: Option<NaiveDate>,
    pub description: Option<String>,
}

const EXPENSE_COLUMNS: &str =
    "id, admin_id, category, amount, expense_date, description, created_at, updated_at";

impl ExpenseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a new expense for the tenant
    pub async fn create_expense(
        &self,
        ctx: &TenantContext,
        input: CreateExpenseInput,
    ) -> AppResult<Expense> {
        ctx.require_admin()?;

        validate_price(input.amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })?;

        if input.category.trim().is_empty() {
            return Err(AppError::Validation {
                field: "category".to_string(),
                message: "Category is required".to_string(),
            });
        }

        let expense_date = input
            .expense_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let expense = sqlx::query_as::<_, Expense>(&format!(
            "INSERT INTO expenses (admin_id, category, amount, expense_date, description) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {EXPENSE_COLUMNS}"
        ))
        .bind(ctx.tenant_id)
        .bind(input.category.trim())
        .bind(input.amount)
        .bind(expense_date)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(expense)
    }

    /// List the tenant's expenses, most recent date first
    pub async fn list_expenses(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Expense>> {
        ctx.require_admin()?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM expenses WHERE admin_id = $1")
                .bind(ctx.tenant_id)
                .fetch_one(&self.db)
                .await?;

        let expenses = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE admin_id = $1 \
             ORDER BY expense_date DESC, created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(ctx.tenant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: expenses,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// Fetch a single expense scoped to the tenant
    pub async fn get_expense(&self, ctx: &TenantContext, expense_id: Uuid) -> AppResult<Expense> {
        ctx.require_admin()?;

        sqlx::query_as::<_, Expense>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1 AND admin_id = $2"
        ))
        .bind(expense_id)
        .bind(ctx.tenant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Expense".to_string()))
    }

    /// Update an expense
    pub async fn update_expense(
        &self,
        ctx: &TenantContext,
        expense_id: Uuid,
        input: UpdateExpenseInput,
    ) -> AppResult<Expense> {
        ctx.require_admin()?;

        let existing = self.get_expense(ctx, expense_id).await?;

        let category = input.category.unwrap_or(existing.category);
        let amount = input.amount.unwrap_or(existing.amount);
        let expense_date = input.expense_date.unwrap_or(existing.expense_date);
        let description = input.description.or(existing.description);

        validate_price(amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })?;

        let expense = sqlx::query_as::<_, Expense>(&format!(
            "UPDATE expenses \
             SET category = $1, amount = $2, expense_date = $3, description = $4, \
                 updated_at = NOW() \
             WHERE id = $5 AND admin_id = $6 \
             RETURNING {EXPENSE_COLUMNS}"
        ))
        .bind(category.trim())
        .bind(amount)
        .bind(expense_date)
        .bind(&description)
        .bind(expense_id)
        .bind(ctx.tenant_id)
        .fetch_one(&self.db)
        .await?;

        Ok(expense)
    }

    /// Delete an expense
    pub async fn delete_expense(&self, ctx: &TenantContext, expense_id: Uuid) -> AppResult<()> {
        ctx.require_admin()?;

        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND admin_id = $2")
            .bind(expense_id)
            .bind(ctx.tenant_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Expense".to_string()));
        }

        Ok(())
    }
}
