//! Milk sale service
//!
//! Sales debit the tenant's stock ledger and credit the customer's running
//! totals (quantity taken, amount billed) in one transaction. Edits apply
//! signed deltas to both, re-validating stock sufficiency when the sold
//! quantity grows; deletes reverse the sale completely but are only
//! permitted within a 12-hour window of creation.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;
use crate::services::tenant::TenantContext;
use shared::models::PaymentStatus;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta, Role};
use shared::validation::{validate_positive_quantity, validate_price};

/// Sales may only be deleted this long after creation
const DELETE_WINDOW_HOURS: i64 = 12;

/// Milk sale service
#[derive(Clone)]
pub struct MilkSaleService {
    db: PgPool,
}

/// A milk sale record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MilkSale {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub customer_id: Uuid,
    pub sale_date: NaiveDate,
    pub quantity: Decimal,
    pub price_per_liter: Decimal,
    pub total_price: Decimal,
    pub payment_status: String,
    pub recorded_by: Uuid,
    pub recorded_by_role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A sale joined with the customer's contact details
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MilkSaleWithCustomer {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub sale_date: NaiveDate,
    pub quantity: Decimal,
    pub price_per_liter: Decimal,
    pub total_price: Decimal,
    pub payment_status: String,
    pub recorded_by: Uuid,
    pub recorded_by_role: String,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a sale
///
/// `quantity` and `price_per_liter` are required; they are optional here
/// so a missing field surfaces as a validation error rather than a
/// deserialization failure.
#[derive(Debug, Deserialize)]
pub struct RecordSaleInput {
    pub customer_id: Uuid,
    pub sale_date: Option<NaiveDate>,
    pub quantity: Option<Decimal>,
    pub price_per_liter: Option<Decimal>,
    /// Defaults to `quantity * price_per_liter` when omitted; otherwise
    /// stored as given
    pub total_price: Option<Decimal>,
    pub payment_status: Option<PaymentStatus>,
}

/// Input for updating a sale; omitted fields keep their stored values
#[derive(Debug, Deserialize)]
pub struct UpdateSaleInput {
    pub sale_date: Option<NaiveDate>,
    pub quantity: Option<Decimal>,
    pub price_per_liter: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub payment_status: Option<PaymentStatus>,
}

/// Whether a sale created at `created_at` may still be deleted at `now`
pub(crate) fn within_delete_window(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - created_at <= Duration::hours(DELETE_WINDOW_HOURS)
}

impl MilkSaleService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a sale: debit the ledger, credit the customer's totals
    pub async fn record_sale(
        &self,
        ctx: &TenantContext,
        input: RecordSaleInput,
    ) -> AppResult<MilkSale> {
        ctx.require_staff()?;

        let quantity = input.quantity.ok_or_else(|| AppError::Validation {
            field: "quantity".to_string(),
            message: "Quantity is required".to_string(),
        })?;
        let price_per_liter = input.price_per_liter.ok_or_else(|| AppError::Validation {
            field: "price_per_liter".to_string(),
            message: "Price per liter is required".to_string(),
        })?;

        validate_positive_quantity(quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;
        validate_price(price_per_liter).map_err(|msg| AppError::Validation {
            field: "price_per_liter".to_string(),
            message: msg.to_string(),
        })?;

        let total_price = input.total_price.unwrap_or(quantity * price_per_liter);
        let payment_status = input.payment_status.unwrap_or_default();
        let sale_date = input.sale_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        // Customer must belong to this tenant
        let customer_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1 AND admin_id = $2)",
        )
        .bind(input.customer_id)
        .bind(ctx.tenant_id)
        .fetch_one(&mut *tx)
        .await?;

        if !customer_exists {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        // Sufficiency is checked under the ledger row lock
        StockService::debit(&mut tx, ctx.tenant_id, quantity).await?;

        let sale = sqlx::query_as::<_, MilkSale>(
            r#"
            INSERT INTO milk_sales (
                admin_id, customer_id, sale_date, quantity, price_per_liter,
                total_price, payment_status, recorded_by, recorded_by_role
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, admin_id, customer_id, sale_date, quantity, price_per_liter,
                      total_price, payment_status, recorded_by, recorded_by_role,
                      created_at, updated_at
            "#,
        )
        .bind(ctx.tenant_id)
        .bind(input.customer_id)
        .bind(sale_date)
        .bind(quantity)
        .bind(price_per_liter)
        .bind(total_price)
        .bind(payment_status.as_str())
        .bind(ctx.actor_id)
        .bind(ctx.role.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE customers \
             SET total_milk_taken = total_milk_taken + $1, \
                 total_amount_billed = total_amount_billed + $2, \
                 updated_at = NOW() \
             WHERE id = $3",
        )
        .bind(quantity)
        .bind(total_price)
        .bind(input.customer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(sale)
    }

    /// Update a sale, applying quantity and price deltas to the ledger and
    /// the customer's totals
    pub async fn update_sale(
        &self,
        ctx: &TenantContext,
        sale_id: Uuid,
        input: UpdateSaleInput,
    ) -> AppResult<MilkSale> {
        ctx.require_admin()?;

        let mut tx = self.db.begin().await?;

        let old = sqlx::query_as::<_, MilkSale>(
            r#"
            SELECT id, admin_id, customer_id, sale_date, quantity, price_per_liter,
                   total_price, payment_status, recorded_by, recorded_by_role,
                   created_at, updated_at
            FROM milk_sales
            WHERE id = $1 AND admin_id = $2
            FOR UPDATE
            "#,
        )
        .bind(sale_id)
        .bind(ctx.tenant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let new_quantity = input.quantity.unwrap_or(old.quantity);
        validate_positive_quantity(new_quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        let price_per_liter = input.price_per_liter.unwrap_or(old.price_per_liter);
        validate_price(price_per_liter).map_err(|msg| AppError::Validation {
            field: "price_per_liter".to_string(),
            message: msg.to_string(),
        })?;

        // total_price is independently patchable; it is not re-derived
        // from quantity * price_per_liter
        let total_price = input.total_price.unwrap_or(old.total_price);
        let payment_status = match input.payment_status {
            Some(status) => status.as_str().to_string(),
            None => old.payment_status.clone(),
        };
        let sale_date = input.sale_date.unwrap_or(old.sale_date);

        let qty_diff = new_quantity - old.quantity;
        let price_diff = total_price - old.total_price;

        // A larger sale takes more milk out of stock; a smaller one
        // returns the difference
        if qty_diff > Decimal::ZERO {
            StockService::debit(&mut tx, ctx.tenant_id, qty_diff).await?;
        } else if qty_diff < Decimal::ZERO {
            StockService::credit(&mut tx, ctx.tenant_id, -qty_diff).await?;
        }

        let sale = sqlx::query_as::<_, MilkSale>(
            r#"
            UPDATE milk_sales
            SET sale_date = $1, quantity = $2, price_per_liter = $3,
                total_price = $4, payment_status = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING id, admin_id, customer_id, sale_date, quantity, price_per_liter,
                      total_price, payment_status, recorded_by, recorded_by_role,
                      created_at, updated_at
            "#,
        )
        .bind(sale_date)
        .bind(new_quantity)
        .bind(price_per_liter)
        .bind(total_price)
        .bind(&payment_status)
        .bind(sale_id)
        .fetch_one(&mut *tx)
        .await?;

        if qty_diff != Decimal::ZERO || price_diff != Decimal::ZERO {
            sqlx::query(
                "UPDATE customers \
                 SET total_milk_taken = total_milk_taken + $1, \
                     total_amount_billed = total_amount_billed + $2, \
                     updated_at = NOW() \
                 WHERE id = $3",
            )
            .bind(qty_diff)
            .bind(price_diff)
            .bind(old.customer_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(sale)
    }

    /// Delete a sale within the 12-hour window, restoring the ledger and
    /// the customer's totals to their pre-sale values
    pub async fn delete_sale(&self, ctx: &TenantContext, sale_id: Uuid) -> AppResult<()> {
        ctx.require_admin()?;

        let mut tx = self.db.begin().await?;

        let sale = sqlx::query_as::<_, MilkSale>(
            r#"
            SELECT id, admin_id, customer_id, sale_date, quantity, price_per_liter,
                   total_price, payment_status, recorded_by, recorded_by_role,
                   created_at, updated_at
            FROM milk_sales
            WHERE id = $1 AND admin_id = $2
            FOR UPDATE
            "#,
        )
        .bind(sale_id)
        .bind(ctx.tenant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        if !within_delete_window(sale.created_at, Utc::now()) {
            return Err(AppError::DeleteWindowExpired);
        }

        StockService::credit(&mut tx, ctx.tenant_id, sale.quantity).await?;

        sqlx::query(
            "UPDATE customers \
             SET total_milk_taken = total_milk_taken - $1, \
                 total_amount_billed = total_amount_billed - $2, \
                 updated_at = NOW() \
             WHERE id = $3",
        )
        .bind(sale.quantity)
        .bind(sale.total_price)
        .bind(sale.customer_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM milk_sales WHERE id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// List sales for the tenant, newest first
    pub async fn list_sales(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<MilkSaleWithCustomer>> {
        ctx.require_admin()?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM milk_sales WHERE admin_id = $1",
        )
        .bind(ctx.tenant_id)
        .fetch_one(&self.db)
        .await?;

        let sales = sqlx::query_as::<_, MilkSaleWithCustomer>(
            r#"
            SELECT ms.id, ms.customer_id, c.name AS customer_name, c.phone AS customer_phone,
                   ms.sale_date, ms.quantity, ms.price_per_liter, ms.total_price,
                   ms.payment_status, ms.recorded_by, ms.recorded_by_role, ms.created_at
            FROM milk_sales ms
            JOIN customers c ON c.id = ms.customer_id
            WHERE ms.admin_id = $1
            ORDER BY ms.sale_date DESC, ms.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(ctx.tenant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: sales,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// Fetch a single sale scoped to the tenant
    pub async fn get_sale(
        &self,
        ctx: &TenantContext,
        sale_id: Uuid,
    ) -> AppResult<MilkSaleWithCustomer> {
        ctx.require_admin()?;

        sqlx::query_as::<_, MilkSaleWithCustomer>(
            r#"
            SELECT ms.id, ms.customer_id, c.name AS customer_name, c.phone AS customer_phone,
                   ms.sale_date, ms.quantity, ms.price_per_liter, ms.total_price,
                   ms.payment_status, ms.recorded_by, ms.recorded_by_role, ms.created_at
            FROM milk_sales ms
            JOIN customers c ON c.id = ms.customer_id
            WHERE ms.id = $1 AND ms.admin_id = $2
            "#,
        )
        .bind(sale_id)
        .bind(ctx.tenant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))
    }

    /// Sale history for one customer
    ///
    /// Staff may view any customer of the tenant; a customer actor may
    /// only view their own history.
    pub async fn customer_history(
        &self,
        ctx: &TenantContext,
        customer_id: Uuid,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<MilkSaleWithCustomer>> {
        if ctx.role == Role::Customer && ctx.actor_id != customer_id {
            return Err(AppError::Unauthorized(
                "Customers can only view their own history".to_string(),
            ));
        }

        let customer_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1 AND admin_id = $2)",
        )
        .bind(customer_id)
        .bind(ctx.tenant_id)
        .fetch_one(&self.db)
        .await?;

        if !customer_exists {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM milk_sales WHERE customer_id = $1 AND admin_id = $2",
        )
        .bind(customer_id)
        .bind(ctx.tenant_id)
        .fetch_one(&self.db)
        .await?;

        let sales = sqlx::query_as::<_, MilkSaleWithCustomer>(
            r#"
            SELECT ms.id, ms.customer_id, c.name AS customer_name, c.phone AS customer_phone,
                   ms.sale_date, ms.quantity, ms.price_per_liter, ms.total_price,
                   ms.payment_status, ms.recorded_by, ms.recorded_by_role, ms.created_at
            FROM milk_sales ms
            JOIN customers c ON c.id = ms.customer_id
            WHERE ms.customer_id = $1 AND ms.admin_id = $2
            ORDER BY ms.sale_date DESC, ms.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(customer_id)
        .bind(ctx.tenant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: sales,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }
}
