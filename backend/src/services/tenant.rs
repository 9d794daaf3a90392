//! Tenant resolution service
//!
//! Every piece of farm data is owned by an admin (the tenant). Admin actors
//! are their own tenant; workers and customers resolve to the admin that
//! created them. Resolution is a pure lookup with no side effects and is
//! performed once per request, then passed to the domain services.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use shared::types::Role;

/// Resolved tenant context for an authenticated request
#[derive(Debug, Clone, Copy)]
pub struct TenantContext {
    /// The admin that owns all data touched by this request
    pub tenant_id: Uuid,
    /// The acting user (admin, worker, or customer)
    pub actor_id: Uuid,
    pub role: Role,
}

impl TenantContext {
    /// Reject customer actors; milk and sale mutations are staff-only
    pub fn require_staff(&self) -> AppResult<()> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Unauthorized(
                "This operation requires a staff account".to_string(),
            ))
        }
    }

    /// Reject everyone but the tenant admin
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Unauthorized(
                "This operation requires an admin account".to_string(),
            ))
        }
    }
}

/// Resolves the owning tenant for an authenticated actor
#[derive(Clone)]
pub struct TenantResolver {
    db: PgPool,
}

impl TenantResolver {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Resolve the tenant for the given actor
    ///
    /// Fails with `NotFound` when a worker or customer token references an
    /// actor record that no longer exists.
    pub async fn resolve(&self, user: &AuthUser) -> AppResult<TenantContext> {
        let tenant_id = match user.role {
            Role::Admin => user.actor_id,
            Role::Worker => {
                sqlx::query_scalar::<_, Uuid>("SELECT admin_id FROM workers WHERE id = $1")
                    .bind(user.actor_id)
                    .fetch_optional(&self.db)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Worker".to_string()))?
            }
            Role::Customer => {
                sqlx::query_scalar::<_, Uuid>("SELECT admin_id FROM customers WHERE id = $1")
                    .bind(user.actor_id)
                    .fetch_optional(&self.db)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Customer".to_string()))?
            }
        };

        Ok(TenantContext {
            tenant_id,
            actor_id: user.actor_id,
            role: user.role,
        })
    }
}
