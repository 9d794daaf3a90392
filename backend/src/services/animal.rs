//! Animal registry service
//!
//! Tenant-scoped herd management. Tag IDs are unique within a tenant;
//! production records reference animals by id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::tenant::TenantContext;
use shared::models::{AnimalStatus, HealthStatus, Species};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_tag_id;

/// Animal registry service
#[derive(Clone)]
pub struct AnimalService {
    db: PgPool,
}

/// An animal in the herd
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Animal {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub tag_id: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub purchase_date: Option<NaiveDate>,
    pub is_pregnant: bool,
    pub health_status: String,
    pub current_status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering an animal
#[derive(Debug, Deserialize)]
pub struct CreateAnimalInput {
    pub tag_id: String,
    pub species: Species,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub purchase_date: Option<NaiveDate>,
    pub is_pregnant: Option<bool>,
    pub health_status: Option<HealthStatus>,
    pub notes: Option<String>,
}

/// Input for updating an animal; omitted fields keep their stored values
#[derive(Debug, Deserialize)]
pub struct UpdateAnimalInput {
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub purchase_date: Option<NaiveDate>,
    pub is_pregnant: Option<bool>,
    pub health_status: Option<HealthStatus>,
    pub current_status: Option<AnimalStatus>,
    pub notes: Option<String>,
}

impl AnimalService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a new animal for the tenant
    pub async fn create_animal(
        &self,
        ctx: &TenantContext,
        input: CreateAnimalInput,
    ) -> AppResult<Animal> {
        ctx.require_admin()?;

        validate_tag_id(&input.tag_id).map_err(|msg| AppError::Validation {
            field: "tag_id".to_string(),
            message: msg.to_string(),
        })?;

        let tag_id = input.tag_id.trim().to_string();

        let duplicate = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM animals WHERE admin_id = $1 AND tag_id = $2)",
        )
        .bind(ctx.tenant_id)
        .bind(&tag_id)
        .fetch_one(&self.db)
        .await?;

        if duplicate {
            return Err(AppError::DuplicateEntry("tag_id".to_string()));
        }

        let animal = sqlx::query_as::<_, Animal>(
            r#"
            INSERT INTO animals (
                admin_id, tag_id, species, breed, age, purchase_date,
                is_pregnant, health_status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, admin_id, tag_id, species, breed, age, purchase_date,
                      is_pregnant, health_status, current_status, notes,
                      created_at, updated_at
            "#,
        )
        .bind(ctx.tenant_id)
        .bind(&tag_id)
        .bind(input.species.as_str())
        .bind(&input.breed)
        .bind(input.age)
        .bind(input.purchase_date)
        .bind(input.is_pregnant.unwrap_or(false))
        .bind(input.health_status.unwrap_or_default().as_str())
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(animal)
    }

    /// List the tenant's animals, newest first
    pub async fn list_animals(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Animal>> {
        ctx.require_staff()?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM animals WHERE admin_id = $1")
                .bind(ctx.tenant_id)
                .fetch_one(&self.db)
                .await?;

        let animals = sqlx::query_as::<_, Animal>(
            r#"
            SELECT id, admin_id, tag_id, species, breed, age, purchase_date,
                   is_pregnant, health_status, current_status, notes,
                   created_at, updated_at
            FROM animals
            WHERE admin_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(ctx.tenant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: animals,
            pagination: PaginationMeta::new(&pagination, total as u64),
        })
    }

    /// Fetch a single animal scoped to the tenant
    pub async fn get_animal(&self, ctx: &TenantContext, animal_id: Uuid) -> AppResult<Animal> {
        ctx.require_staff()?;

        sqlx::query_as::<_, Animal>(
            r#"
            SELECT id, admin_id, tag_id, species, breed, age, purchase_date,
                   is_pregnant, health_status, current_status, notes,
                   created_at, updated_at
            FROM animals
            WHERE id = $1 AND admin_id = $2
            "#,
        )
        .bind(animal_id)
        .bind(ctx.tenant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Animal".to_string()))
    }

    /// Update an animal's details
    pub async fn update_animal(
        &self,
        ctx: &TenantContext,
        animal_id: Uuid,
        input: UpdateAnimalInput,
    ) -> AppResult<Animal> {
        ctx.require_admin()?;

        let existing = self.get_animal(ctx, animal_id).await?;

        let breed = input.breed.or(existing.breed);
        let age = input.age.or(existing.age);
        let purchase_date = input.purchase_date.or(existing.purchase_date);
        let is_pregnant = input.is_pregnant.unwrap_or(existing.is_pregnant);
        let health_status = match input.health_status {
            Some(status) => status.as_str().to_string(),
            None => existing.health_status,
        };
        let current_status = match input.current_status {
            Some(status) => status.as_str().to_string(),
            None => existing.current_status,
        };
        let notes = input.notes.or(existing.notes);

        let animal = sqlx::query_as::<_, Animal>(
            r#"
            UPDATE animals
            SET breed = $1, age = $2, purchase_date = $3, is_pregnant = $4,
                health_status = $5, current_status = $6, notes = $7, updated_at = NOW()
            WHERE id = $8 AND admin_id = $9
            RETURNING id, admin_id, tag_id, species, breed, age, purchase_date,
                      is_pregnant, health_status, current_status, notes,
                      created_at, updated_at
            "#,
        )
        .bind(&breed)
        .bind(age)
        .bind(purchase_date)
        .bind(is_pregnant)
        .bind(&health_status)
        .bind(&current_status)
        .bind(&notes)
        .bind(animal_id)
        .bind(ctx.tenant_id)
        .fetch_one(&self.db)
        .await?;

        Ok(animal)
    }

    /// Remove an animal from the registry
    pub async fn delete_animal(&self, ctx: &TenantContext, animal_id: Uuid) -> AppResult<()> {
        ctx.require_admin()?;

        let result = sqlx::query("DELETE FROM animals WHERE id = $1 AND admin_id = $2")
            .bind(animal_id)
            .bind(ctx.tenant_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Animal".to_string()));
        }

        Ok(())
    }
}
