//! Milk stock ledger service
//!
//! Each tenant owns exactly one `milk_stock` row (enforced by a unique
//! constraint on `admin_id`), created lazily on first use. The row is the
//! single point of synchronization for a tenant: production records credit
//! it, sales debit it, and concurrent adjustments serialize on the row
//! lock taken by `ON CONFLICT DO UPDATE` / `SELECT .. FOR UPDATE`.
//!
//! The balance is never allowed to cross zero: debits check sufficiency
//! under the row lock before applying, inside the caller's transaction.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Stock ledger service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Current stock balance for a tenant
    ///
    /// Read-only: returns 0 when no ledger row exists yet and never
    /// creates one.
    pub async fn get_stock(&self, tenant_id: Uuid) -> AppResult<Decimal> {
        let balance = sqlx::query_scalar::<_, Decimal>(
            "SELECT total_milk FROM milk_stock WHERE admin_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(balance.unwrap_or(Decimal::ZERO))
    }

    /// Credit the tenant's ledger by a non-negative amount within the
    /// caller's transaction, creating the row if needed
    pub async fn credit(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: Uuid,
        amount: Decimal,
    ) -> AppResult<Decimal> {
        Self::adjust(tx, tenant_id, amount).await
    }

    /// Debit the tenant's ledger by `amount` within the caller's
    /// transaction
    ///
    /// Locks the ledger row (creating it first if needed) and checks
    /// sufficiency under the lock, so two concurrent debits cannot both
    /// pass the check against a stale balance. Fails with
    /// `InsufficientStock` when the balance would cross zero.
    pub async fn debit(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: Uuid,
        amount: Decimal,
    ) -> AppResult<Decimal> {
        let balance = Self::balance_for_update(tx, tenant_id).await?;

        if balance < amount {
            return Err(AppError::InsufficientStock(format!(
                "Available stock {} is less than required {}",
                balance, amount
            )));
        }

        Self::adjust(tx, tenant_id, -amount).await
    }

    /// Lock the tenant's ledger row and return its balance
    ///
    /// The row is created with a zero balance if it does not exist yet;
    /// the subsequent `FOR UPDATE` holds it until the transaction ends.
    pub async fn balance_for_update(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: Uuid,
    ) -> AppResult<Decimal> {
        sqlx::query(
            "INSERT INTO milk_stock (admin_id, total_milk) VALUES ($1, 0) \
             ON CONFLICT (admin_id) DO NOTHING",
        )
        .bind(tenant_id)
        .execute(&mut **tx)
        .await?;

        let balance = sqlx::query_scalar::<_, Decimal>(
            "SELECT total_milk FROM milk_stock WHERE admin_id = $1 FOR UPDATE",
        )
        .bind(tenant_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(balance)
    }

    /// Apply a signed delta to the tenant's ledger
    ///
    /// Lazy upsert: a missing row is created holding `GREATEST(delta, 0)`,
    /// so a freshly created ledger never starts negative. Callers must
    /// have checked sufficiency before passing a negative delta that could
    /// cross zero; the schema CHECK constraint is only a backstop.
    async fn adjust(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: Uuid,
        delta: Decimal,
    ) -> AppResult<Decimal> {
        let balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            INSERT INTO milk_stock (admin_id, total_milk)
            VALUES ($1, GREATEST($2, 0))
            ON CONFLICT (admin_id)
            DO UPDATE SET total_milk = milk_stock.total_milk + $2, updated_at = NOW()
            RETURNING total_milk
            "#,
        )
        .bind(tenant_id)
        .bind(delta)
        .fetch_one(&mut **tx)
        .await?;

        Ok(balance)
    }
}
