//! Farm dashboard service
//!
//! Admin-only summary of a tenant's farm: herd and staff counts, lifetime
//! production and income, total expenses, and the current stock balance.
//! Read-only aggregates; nothing here mutates state.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::services::tenant::TenantContext;

/// Farm dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

/// Per-tenant farm summary
///
/// `total_milk_produced` and `total_income` are lifetime sums over the
/// surviving records; `current_stock` is the live ledger balance, so
/// produced minus sold equals stock only while nothing is in flight.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_animals: i64,
    pub total_workers: i64,
    pub total_milk_produced: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub current_stock: Decimal,
}

impl DashboardService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Build the tenant's summary
    pub async fn summary(&self, ctx: &TenantContext) -> AppResult<DashboardSummary> {
        ctx.require_admin()?;

        let total_animals =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM animals WHERE admin_id = $1")
                .bind(ctx.tenant_id)
                .fetch_one(&self.db)
                .await?;

        let total_workers =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM workers WHERE admin_id = $1")
                .bind(ctx.tenant_id)
                .fetch_one(&self.db)
                .await?;

        let total_milk_produced = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(total_yield), 0) FROM milk_records WHERE admin_id = $1",
        )
        .bind(ctx.tenant_id)
        .fetch_one(&self.db)
        .await?;

        let total_income = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(total_price), 0) FROM milk_sales WHERE admin_id = $1",
        )
        .bind(ctx.tenant_id)
        .fetch_one(&self.db)
        .await?;

        let total_expenses = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE admin_id = $1",
        )
        .bind(ctx.tenant_id)
        .fetch_one(&self.db)
        .await?;

        let current_stock = sqlx::query_scalar::<_, Decimal>(
            "SELECT total_milk FROM milk_stock WHERE admin_id = $1",
        )
        .bind(ctx.tenant_id)
        .fetch_optional(&self.db)
        .await?
        .unwrap_or(Decimal::ZERO);

        Ok(DashboardSummary {
            total_animals,
            total_workers,
            total_milk_produced,
            total_income,
            total_expenses,
            current_stock,
        })
    }
}
