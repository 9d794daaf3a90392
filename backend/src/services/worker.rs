//! Worker account service
//!
//! Admin-only management of farm worker accounts. Workers log in through
//! the auth service and record milk on behalf of their admin.

use chrono::{DateTime, NaiveDate, Utc};
use bcrypt::{hash, DEFAULT_COST};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::tenant::TenantContext;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::{validate_email, validate_password};

/// Worker account service
#[derive(Clone)]
pub struct WorkerService {
    db: PgPool,
}

/// A worker account (password hash never leaves the service)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Worker {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub joined_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a worker account
#[derive(Debug, Deserialize)]
pub struct CreateWorkerInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub joined_date: Option<NaiveDate>,
}

/// Input for updating a worker; a new password is re-hashed
#[derive(Debug, Deserialize)]
pub struct UpdateWorkerInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
}

const WORKER_COLUMNS: &str =
    "id, admin_id, name, email, phone, address, joined_date, created_at, updated_at";

impl WorkerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a worker account under the tenant
    pub async fn create_worker(
        &self,
        ctx: &TenantContext,
        input: CreateWorkerInput,
    ) -> AppResult<Worker> {
        ctx.require_admin()?;

        validate_email(&input.email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
        })?;
        validate_password(&input.password).map_err(|msg| AppError::Validation {
            field: "password".to_string(),
            message: msg.to_string(),
        })?;

        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM workers WHERE email = $1")
                .bind(&input.email)
                .fetch_one(&self.db)
                .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let worker = sqlx::query_as::<_, Worker>(&format!(
            "INSERT INTO workers (admin_id, name, email, password_hash, phone, address, joined_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {WORKER_COLUMNS}"
        ))
        .bind(ctx.tenant_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(input.joined_date)
        .fetch_one(&self.db)
        .await?;

        Ok(worker)
    }

    /// List the tenant's workers, newest first
    pub async fn list_workers(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Worker>> {
        ctx.require_admin()?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM workers WHERE admin_id = $1")
                .bind(ctx.tenant_id)
                .fetch_one(&self.db)
                .await?;

        let workers = sqlx::query_as::<_, Worker>(&format!(
            "SELECT {WORKER_COLUMNS} FROM workers WHERE admin_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(ctx.tenant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: workers,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// Fetch a single worker scoped to the tenant
    pub async fn get_worker(&self, ctx: &TenantContext, worker_id: Uuid) -> AppResult<Worker> {
        ctx.require_admin()?;

        sqlx::query_as::<_, Worker>(&format!(
            "SELECT {WORKER_COLUMNS} FROM workers WHERE id = $1 AND admin_id = $2"
        ))
        .bind(worker_id)
        .bind(ctx.tenant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Worker".to_string()))
    }

    /// Update a worker's details
    pub async fn update_worker(
        &self,
        ctx: &TenantContext,
        worker_id: Uuid,
        input: UpdateWorkerInput,
    ) -> AppResult<Worker> {
        ctx.require_admin()?;

        let existing = self.get_worker(ctx, worker_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let phone = input.phone.or(existing.phone);
        let address = input.address.or(existing.address);

        let password_hash = match &input.password {
            Some(password) => {
                validate_password(password).map_err(|msg| AppError::Validation {
                    field: "password".to_string(),
                    message: msg.to_string(),
                })?;
                Some(
                    hash(password, DEFAULT_COST).map_err(|e| {
                        AppError::Internal(format!("Password hashing failed: {}", e))
                    })?,
                )
            }
            None => None,
        };

        let worker = sqlx::query_as::<_, Worker>(&format!(
            "UPDATE workers \
             SET name = $1, phone = $2, address = $3, \
                 password_hash = COALESCE($4, password_hash), updated_at = NOW() \
             WHERE id = $5 AND admin_id = $6 \
             RETURNING {WORKER_COLUMNS}"
        ))
        .bind(&name)
        .bind(&phone)
        .bind(&address)
        .bind(&password_hash)
        .bind(worker_id)
        .bind(ctx.tenant_id)
        .fetch_one(&self.db)
        .await?;

        Ok(worker)
    }

    /// Delete a worker account
    pub async fn delete_worker(&self, ctx: &TenantContext, worker_id: Uuid) -> AppResult<()> {
        ctx.require_admin()?;

        let result = sqlx::query("DELETE FROM workers WHERE id = $1 AND admin_id = $2")
            .bind(worker_id)
            .bind(ctx.tenant_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Worker".to_string()));
        }

        Ok(())
    }
}
