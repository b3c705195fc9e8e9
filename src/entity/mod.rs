//! Entity module - SeaORM entity definitions
//!
//! Every table carries the same bookkeeping columns: `active`, `create_at`
//! and a nullable `delete_at` (soft delete).

use sea_orm::prelude::DateTimeUtc;
use serde::{Deserialize, Serialize};

pub mod form;
pub mod form_module;
pub mod module;
pub mod permission;
pub mod person;
pub mod role;
pub mod role_form_permission;
pub mod role_user;
pub mod user;

/// Soft-delete state of a row, decoded from the nullable `delete_at` column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Lifecycle {
    Live,
    Deleted { at: DateTimeUtc },
}

impl Lifecycle {
    pub fn is_live(&self) -> bool {
        matches!(self, Lifecycle::Live)
    }

    /// Column value for this state
    pub fn delete_at(&self) -> Option<DateTimeUtc> {
        match self {
            Lifecycle::Live => None,
            Lifecycle::Deleted { at } => Some(*at),
        }
    }
}

impl From<Option<DateTimeUtc>> for Lifecycle {
    fn from(delete_at: Option<DateTimeUtc>) -> Self {
        match delete_at {
            None => Lifecycle::Live,
            Some(at) => Lifecycle::Deleted { at },
        }
    }
}
