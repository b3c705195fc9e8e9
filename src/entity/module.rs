//! Module entity - 功能模块表
//!
//! 表名: sec_module

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::Lifecycle;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sec_module")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// 模块名称 (唯一)
    #[sea_orm(column_type = "String(Some(64))", unique)]
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

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub create_at: DateTimeUtc,
}

impl From<Model> for ModuleResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            active: model.active,
            create_at: model.create_at,
        }
    }
}
