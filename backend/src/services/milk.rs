//! Milk production record service
//!
//! Daily per-animal yield records. At most one record per animal per
//! calendar day per tenant; every add/edit/delete adjusts the stock ledger
//! by the yield delta inside the same transaction, so the ledger never
//! drifts from the sum of recorded yields.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;
use crate::services::tenant::TenantContext;
use shared::models::AnimalStatus;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_yield;

/// Milk production record service
#[derive(Clone)]
pub struct MilkRecordService {
    db: PgPool,
}

/// A daily milk production record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MilkRecord {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub animal_id: Uuid,
    pub record_date: NaiveDate,
    pub morning_yield: Decimal,
    pub evening_yield: Decimal,
    pub total_yield: Decimal,
    pub recorded_by: Uuid,
    pub recorded_by_role: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A production record joined with its animal's identification
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MilkRecordWithAnimal {
    pub id: Uuid,
    pub animal_id: Uuid,
    pub animal_tag: String,
    pub species: String,
    pub record_date: NaiveDate,
    pub morning_yield: Decimal,
    pub evening_yield: Decimal,
    pub total_yield: Decimal,
    pub recorded_by: Uuid,
    pub recorded_by_role: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for adding a production record
#[derive(Debug, Deserialize)]
pub struct AddMilkRecordInput {
    pub animal_id: Uuid,
    /// Defaults to the current UTC calendar day
    pub record_date: Option<NaiveDate>,
    pub morning_yield: Option<Decimal>,
    pub evening_yield: Option<Decimal>,
    pub remarks: Option<String>,
}

/// Input for updating a production record; omitted yields keep their
/// stored values
#[derive(Debug, Deserialize)]
pub struct UpdateMilkRecordInput {
    pub morning_yield: Option<Decimal>,
    pub evening_yield: Option<Decimal>,
    pub remarks: Option<String>,
}

/// Compute the total daily yield; missing values count as zero
pub(crate) fn total_yield(morning: Option<Decimal>, evening: Option<Decimal>) -> Decimal {
    morning.unwrap_or(Decimal::ZERO) + evening.unwrap_or(Decimal::ZERO)
}

impl MilkRecordService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a day's milk yield for an animal and credit the stock ledger
    pub async fn add_record(
        &self,
        ctx: &TenantContext,
        input: AddMilkRecordInput,
    ) -> AppResult<MilkRecord> {
        ctx.require_staff()?;

        for (field, value) in [
            ("morning_yield", input.morning_yield),
            ("evening_yield", input.evening_yield),
        ] {
            if let Some(v) = value {
                validate_yield(v).map_err(|msg| AppError::Validation {
                    field: field.to_string(),
                    message: msg.to_string(),
                })?;
            }
        }

        let morning = input.morning_yield.unwrap_or(Decimal::ZERO);
        let evening = input.evening_yield.unwrap_or(Decimal::ZERO);
        let yield_total = total_yield(input.morning_yield, input.evening_yield);
        let record_date = input.record_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        // Animal must belong to this tenant and still be in production
        let current_status = sqlx::query_scalar::<_, String>(
            "SELECT current_status FROM animals WHERE id = $1 AND admin_id = $2",
        )
        .bind(input.animal_id)
        .bind(ctx.tenant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Animal".to_string()))?;

        let producing = current_status
            .parse::<AnimalStatus>()
            .map(|status| status.can_produce())
            .unwrap_or(false);

        if !producing {
            return Err(AppError::Validation {
                field: "animal_id".to_string(),
                message: format!("Cannot record milk for a {} animal", current_status),
            });
        }

        // One record per animal per calendar day
        let duplicate = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM milk_records \
             WHERE animal_id = $1 AND record_date = $2 AND admin_id = $3)",
        )
        .bind(input.animal_id)
        .bind(record_date)
        .bind(ctx.tenant_id)
        .fetch_one(&mut *tx)
        .await?;

        if duplicate {
            return Err(AppError::DuplicateRecord(
                "Milk record for this animal and date already exists".to_string(),
            ));
        }

        let record = sqlx::query_as::<_, MilkRecord>(
            r#"
            INSERT INTO milk_records (
                admin_id, animal_id, record_date, morning_yield, evening_yield,
                total_yield, recorded_by, recorded_by_role, remarks
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, admin_id, animal_id, record_date, morning_yield, evening_yield,
                      total_yield, recorded_by, recorded_by_role, remarks,
                      created_at, updated_at
            "#,
        )
        .bind(ctx.tenant_id)
        .bind(input.animal_id)
        .bind(record_date)
        .bind(morning)
        .bind(evening)
        .bind(yield_total)
        .bind(ctx.actor_id)
        .bind(ctx.role.as_str())
        .bind(&input.remarks)
        .fetch_one(&mut *tx)
        .await?;

        StockService::credit(&mut tx, ctx.tenant_id, yield_total).await?;

        tx.commit().await?;

        Ok(record)
    }

    /// Update a production record, adjusting the ledger by the yield delta
    pub async fn update_record(
        &self,
        ctx: &TenantContext,
        record_id: Uuid,
        input: UpdateMilkRecordInput,
    ) -> AppResult<MilkRecord> {
        ctx.require_staff()?;

        for (field, value) in [
            ("morning_yield", input.morning_yield),
            ("evening_yield", input.evening_yield),
        ] {
            if let Some(v) = value {
                validate_yield(v).map_err(|msg| AppError::Validation {
                    field: field.to_string(),
                    message: msg.to_string(),
                })?;
            }
        }

        let mut tx = self.db.begin().await?;

        // Lock the record so concurrent edits of the same day serialize
        let old = sqlx::query_as::<_, MilkRecord>(
            r#"
            SELECT id, admin_id, animal_id, record_date, morning_yield, evening_yield,
                   total_yield, recorded_by, recorded_by_role, remarks,
                   created_at, updated_at
            FROM milk_records
            WHERE id = $1 AND admin_id = $2
            FOR UPDATE
            "#,
        )
        .bind(record_id)
        .bind(ctx.tenant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Milk record".to_string()))?;

        let morning = input.morning_yield.unwrap_or(old.morning_yield);
        let evening = input.evening_yield.unwrap_or(old.evening_yield);
        let new_total = morning + evening;
        let diff = new_total - old.total_yield;
        let remarks = input.remarks.or(old.remarks);

        let record = sqlx::query_as::<_, MilkRecord>(
            r#"
            UPDATE milk_records
            SET morning_yield = $1, evening_yield = $2, total_yield = $3,
                remarks = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING id, admin_id, animal_id, record_date, morning_yield, evening_yield,
                      total_yield, recorded_by, recorded_by_role, remarks,
                      created_at, updated_at
            "#,
        )
        .bind(morning)
        .bind(evening)
        .bind(new_total)
        .bind(&remarks)
        .bind(record_id)
        .fetch_one(&mut *tx)
        .await?;

        if diff > Decimal::ZERO {
            StockService::credit(&mut tx, ctx.tenant_id, diff).await?;
        } else if diff < Decimal::ZERO {
            // Reducing recorded production may not take the ledger below
            // what has already been sold
            StockService::debit(&mut tx, ctx.tenant_id, -diff).await?;
        }

        tx.commit().await?;

        Ok(record)
    }

    /// Delete a production record, rolling its yield back out of the ledger
    pub async fn delete_record(&self, ctx: &TenantContext, record_id: Uuid) -> AppResult<()> {
        ctx.require_staff()?;

        let mut tx = self.db.begin().await?;

        let old_total = sqlx::query_scalar::<_, Decimal>(
            "SELECT total_yield FROM milk_records WHERE id = $1 AND admin_id = $2 FOR UPDATE",
        )
        .bind(record_id)
        .bind(ctx.tenant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Milk record".to_string()))?;

        StockService::debit(&mut tx, ctx.tenant_id, old_total).await?;

        sqlx::query("DELETE FROM milk_records WHERE id = $1")
            .bind(record_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// List production records for the tenant, newest first
    pub async fn list_records(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<MilkRecordWithAnimal>> {
        ctx.require_staff()?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM milk_records WHERE admin_id = $1",
        )
        .bind(ctx.tenant_id)
        .fetch_one(&self.db)
        .await?;

        let records = sqlx::query_as::<_, MilkRecordWithAnimal>(
            r#"
            SELECT mr.id, mr.animal_id, a.tag_id AS animal_tag, a.species,
                   mr.record_date, mr.morning_yield, mr.evening_yield, mr.total_yield,
                   mr.recorded_by, mr.recorded_by_role, mr.remarks, mr.created_at
            FROM milk_records mr
            JOIN animals a ON a.id = mr.animal_id
            WHERE mr.admin_id = $1
            ORDER BY mr.record_date DESC, mr.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(ctx.tenant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: records,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// Fetch a single production record scoped to the tenant
    pub async fn get_record(
        &self,
        ctx: &TenantContext,
        record_id: Uuid,
    ) -> AppResult<MilkRecordWithAnimal> {
        ctx.require_staff()?;

        sqlx::query_as::<_, MilkRecordWithAnimal>(
            r#"
            SELECT mr.id, mr.animal_id, a.tag_id AS animal_tag, a.species,
                   mr.record_date, mr.morning_yield, mr.evening_yield, mr.total_yield,
                   mr.recorded_by, mr.recorded_by_role, mr.remarks, mr.created_at
            FROM milk_records mr
            JOIN animals a ON a.id = mr.animal_id
            WHERE mr.id = $1 AND mr.admin_id = $2
            "#,
        )
        .bind(record_id)
        .bind(ctx.tenant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Milk record".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn total_yield_sums_sessions() {
        assert_eq!(total_yield(Some(dec("6.5")), Some(dec("4.5"))), dec("11.0"));
    }

    #[test]
    fn total_yield_treats_missing_as_zero() {
        assert_eq!(total_yield(None, Some(dec("3.0"))), dec("3.0"));
        assert_eq!(total_yield(Some(dec("2.0")), None), dec("2.0"));
        assert_eq!(total_yield(None, None), Decimal::ZERO);
    }
}
