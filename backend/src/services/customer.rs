//! Customer account service
//!
//! Admin-only management of milk customers. Each customer carries running
//! purchase aggregates (total milk taken, total amount billed) that the
//! sale service maintains; this service never writes those columns
//! directly.

use bcrypt::{hash, DEFAULT_COST};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::tenant::TenantContext;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::{validate_email, validate_password, validate_phone};

/// Customer account service
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

/// A milk customer with running purchase aggregates
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub total_milk_taken: Decimal,
    pub total_amount_billed: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a customer account
#[derive(Debug, Deserialize)]
pub struct CreateCustomerInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a customer; purchase aggregates are not editable
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
}

const CUSTOMER_COLUMNS: &str = "id, admin_id, name, email, phone, address, \
     total_milk_taken, total_amount_billed, created_at, updated_at";

impl CustomerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a customer account under the tenant
    pub async fn create_customer(
        &self,
        ctx: &TenantContext,
        input: CreateCustomerInput,
    ) -> AppResult<Customer> {
        ctx.require_admin()?;

        validate_email(&input.email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
        })?;
        validate_password(&input.password).map_err(|msg| AppError::Validation {
            field: "password".to_string(),
            message: msg.to_string(),
        })?;
        if let Some(phone) = &input.phone {
            validate_phone(phone).map_err(|msg| AppError::Validation {
                field: "phone".to_string(),
                message: msg.to_string(),
            })?;
        }

        let existing =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers WHERE email = $1")
                .bind(&input.email)
                .fetch_one(&self.db)
                .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let customer = sqlx::query_as::<_, Customer>(&format!(
            "INSERT INTO customers (admin_id, name, email, password_hash, phone, address) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(ctx.tenant_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(customer)
    }

    /// List the tenant's customers, newest first
    pub async fn list_customers(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Customer>> {
        ctx.require_admin()?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers WHERE admin_id = $1")
                .bind(ctx.tenant_id)
                .fetch_one(&self.db)
                .await?;

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE admin_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(ctx.tenant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: customers,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// Fetch a single customer scoped to the tenant
    pub async fn get_customer(
        &self,
        ctx: &TenantContext,
        customer_id: Uuid,
    ) -> AppResult<Customer> {
        ctx.require_admin()?;

        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1 AND admin_id = $2"
        ))
        .bind(customer_id)
        .bind(ctx.tenant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// Update a customer's contact details
    pub async fn update_customer(
        &self,
        ctx: &TenantContext,
        customer_id: Uuid,
        input: UpdateCustomerInput,
    ) -> AppResult<Customer> {
        ctx.require_admin()?;

        let existing = self.get_customer(ctx, customer_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let phone = input.phone.or(existing.phone);
        let address = input.address.or(existing.address);

        if let Some(p) = &phone {
            validate_phone(p).map_err(|msg| AppError::Validation {
                field: "phone".to_string(),
                message: msg.to_string(),
            })?;
        }

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

        let customer = sqlx::query_as::<_, Customer>(&format!(
            "UPDATE customers \
             SET name = $1, phone = $2, address = $3, \
                 password_hash = COALESCE($4, password_hash), updated_at = NOW() \
             WHERE id = $5 AND admin_id = $6 \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(&name)
        .bind(&phone)
        .bind(&address)
        .bind(&password_hash)
        .bind(customer_id)
        .bind(ctx.tenant_id)
        .fetch_one(&self.db)
        .await?;

        Ok(customer)
    }

    /// Delete a customer account along with its sale history. Stock
    /// already debited for those sales is not restored.
    pub async fn delete_customer(&self, ctx: &TenantContext, customer_id: Uuid) -> AppResult<()> {
        ctx.require_admin()?;

        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND admin_id = $2")
            .bind(customer_id)
            .bind(ctx.tenant_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        Ok(())
    }
}
