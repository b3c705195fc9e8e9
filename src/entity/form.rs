//! Form entity - 表单表
//!
//! 表名: sec_form

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::Lifecycle;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sec_form")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// 表单编码 (唯一), 如 LOGIN_FORM
    #[sea_orm(column_type = "String(Some(64))", unique)]
    pub code: String,

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

/// 表单响应
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub create_at: DateTimeUtc,
}

impl From<Model> for FormResponse {
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
