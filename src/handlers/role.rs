//! Role handlers
//!
//! Role writes go through an audited unit of work, one per request

use axum::{
    extract::{Path, State},
    response::Json,
};
use sea_orm::{ActiveValue, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;

use crate::entity::role::{self, RoleResponse};
use crate::error::{AppError, AppResult, OptionExt};
use crate::routes::ApiResponse;
use crate::state::AppState;
use crate::store::{CatalogKind, Tracked};

/// Add role request
#[derive(Debug, Deserialize)]
pub struct AddRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Update role request
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub description: String,
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::Validation("Role name cannot be empty".to_string()));
    }
    if name.chars().count() > 32 {
        return Err(AppError::Validation(
            "Role name cannot exceed 32 characters".to_string(),
        ));
    }
    Ok(())
}

async fn find_live_role(state: &AppState, id: i64) -> AppResult<role::Model> {
    role::Entity::find_by_id(id)
        .filter(role::Column::DeleteAt.is_null())
        .one(&state.db)
        .await?
        .ok_or_not_found(format!("Role {} not found", id))
}

/// POST /api/roles
pub async fn add_role(
    State(state): State<AppState>,
    Json(req): Json<AddRoleRequest>,
) -> AppResult<Json<ApiResponse<RoleResponse>>> {
    let name = req.name.trim().to_string();
    validate_name(&name)?;

    let mut uow = state.unit_of_work();
    if uow.find_by_key(CatalogKind::Role, &name).await?.is_some() {
        return Err(AppError::Conflict(format!("Role '{}' already exists", name)));
    }

    uow.stage_insert(Tracked::Role(role::ActiveModel {
        name: Set(name.clone()),
        description: Set(req.description),
        ..Default::default()
    }));
    uow.commit().await?;

    let created = role::Entity::find()
        .filter(role::Column::Name.eq(name.as_str()))
        .one(&state.db)
        .await?
        .ok_or_not_found(format!("Role '{}' not found", name))?;

    tracing::info!("Role created: {}", name);
    Ok(Json(ApiResponse::success(created.into())))
}

/// PUT /api/roles/:id
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
) -> AppResult<Json<ApiResponse<RoleResponse>>> {
    find_live_role(&state, id).await?;

    let mut uow = state.unit_of_work();
    uow.stage_update(Tracked::Role(role::ActiveModel {
        id: ActiveValue::Unchanged(id),
        description: Set(req.description),
        ..Default::default()
    }));
    uow.commit().await?;

    let updated = find_live_role(&state, id).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

/// DELETE /api/roles/:id
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let existing = find_live_role(&state, id).await?;

    // Prevent deletion of built-in roles
    if state.catalog.contains(CatalogKind::Role, &existing.name) {
        return Err(AppError::BadRequest(format!(
            "Built-in role '{}' cannot be deleted",
            existing.name
        )));
    }

    let mut uow = state.unit_of_work();
    uow.stage_delete(Tracked::Role(role::ActiveModel {
        id: ActiveValue::Unchanged(id),
        ..Default::default()
    }));
    uow.commit().await?;

    tracing::info!("Role deleted: {}", existing.name);
    Ok(Json(ApiResponse::success_msg("success")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Auditor").is_ok());
        assert!(matches!(validate_name(""), Err(AppError::Validation(_))));
        assert!(matches!(
            validate_name(&"x".repeat(33)),
            Err(AppError::Validation(_))
        ));
        assert!(validate_name(&"角".repeat(32)).is_ok());
    }
}
