//! Role entity - 角色表
//!
//! 表名: sec_role

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::Lifecycle;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sec_role")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// 角色名称 (唯一)
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub name: String,

    /// 描述
    #[sea_orm(column_type = "String(Some(256))")]
    pub description: String,

    pub active: bool,

    /// 创建时间, 写入后不再修改
    pub create_at: DateTimeUtc,

    /// 删除时间 (软删除)
    #[sea_orm(nullable)]
    pub delete_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

// 角色与用户、表单权限的关系由关联表自行声明

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from(self.delete_at)
    }
}

/// 角色响应
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub create_at: DateTimeUtc,
    pub delete_at: Option<DateTimeUtc>,
}

impl From<Model> for RoleResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            active: model.active,
            create_at: model.create_at,
            delete_at: model.delete_at,
        }
    }
}
