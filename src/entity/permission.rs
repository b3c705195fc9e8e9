//! Permission entity - 权限表
//!
//! 表名: sec_permission

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::Lifecycle;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sec_permission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// 权限编码 (唯一), 如 READ / WRITE
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub code: String,

    /// 显示名称
    #[sea_orm(column_type = "String(Some(64))")]
    pub name: String,

    #[sea_orm(column_type = "String(Some(256))")]
    pub description: String,

    pub active: bool,

    pub create_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub delete_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from(self.delete_at)
    }
}

/// 权限响应
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub create_at: DateTimeUtc,
}

impl From<Model> for PermissionResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            description: model.description,
            active: model.active,
            create_at: model.create_at,
        }
    }
}
