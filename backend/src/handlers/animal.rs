//! Animal registry HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::animal::{Animal, AnimalService, CreateAnimalInput, UpdateAnimalInput};
use crate::services::TenantResolver;
use crate::AppState;
use shared::types::{PaginatedResponse, Pagination};

/// Register a new animal
pub async fn create_animal(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateAnimalInput>,
) -> AppResult<(StatusCode, Json<Animal>)> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = AnimalService::new(state.db);
    let animal = service.create_animal(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(animal)))
}

/// List the herd
pub async fn list_animals(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<Animal>>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = AnimalService::new(state.db);
    let page = service.list_animals(&ctx, pagination).await?;
    Ok(Json(page))
}

/// Get a specific animal
pub async fn get_animal(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(animal_id): Path<Uuid>,
) -> AppResult<Json<Animal>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = AnimalService::new(state.db);
    let animal = service.get_animal(&ctx, animal_id).await?;
    Ok(Json(animal))
}

/// Update an animal
pub async fn update_animal(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(animal_id): Path<Uuid>,
    Json(input): Json<UpdateAnimalInput>,
) -> AppResult<Json<Animal>> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = AnimalService::new(state.db);
    let animal = service.update_animal(&ctx, animal_id, input).await?;
    Ok(Json(animal))
}

/// Delete an animal
pub async fn delete_animal(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(animal_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let ctx = TenantResolver::new(state.db.clone())
        .resolve(&current_user.0)
        .await?;
    let service = AnimalService::new(state.db);
    service.delete_animal(&ctx, animal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
