//! Farm dashboard HTTP handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::dashboard::{DashboardService, DashboardSummary};
use crate::services::TenantResolver;
use crate::AppState;

/// Tenant-wide farm summary
pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardSummary>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = DashboardService::new(state.db);
    let summary = service.summary(&ctx).await?;
    Ok(Json(summary))
}
