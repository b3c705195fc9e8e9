//! Catalog handlers
//!
//! Read-only listings of the live catalog rows

use axum::{extract::State, response::Json};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::entity::form::{self, FormResponse};
use crate::entity::module::{self, ModuleResponse};
use crate::entity::permission::{self, PermissionResponse};
use crate::entity::role::{self, RoleResponse};
use crate::error::AppResult;
use crate::routes::ApiResponse;
use crate::state::AppState;

/// GET /api/roles
pub async fn list_roles(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<RoleResponse>>>> {
    let roles = role::Entity::find()
        .filter(role::Column::DeleteAt.is_null())
        .order_by_asc(role::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::success(
        roles.into_iter().map(RoleResponse::from).collect(),
    )))
}

/// GET /api/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<PermissionResponse>>>> {
    let permissions = permission::Entity::find()
        .filter(permission::Column::DeleteAt.is_null())
        .order_by_asc(permission::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::success(
        permissions.into_iter().map(PermissionResponse::from).collect(),
    )))
}

/// GET /api/modules
pub async fn list_modules(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ModuleResponse>>>> {
    let modules = module::Entity::find()
        .filter(module::Column::DeleteAt.is_null())
        .order_by_asc(module::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::success(
        modules.into_iter().map(ModuleResponse::from).collect(),
    )))
}

/// GET /api/forms
pub async fn list_forms(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<FormResponse>>>> {
    let forms = form::Entity::find()
        .filter(form::Column::DeleteAt.is_null())
        .order_by_asc(form::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApiResponse::success(
        forms.into_iter().map(FormResponse::from).collect(),
    )))
}
