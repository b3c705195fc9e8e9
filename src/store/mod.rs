//! Unit-of-work store abstraction
//!
//! A [`Store`] stages entity changes and writes them on commit. Catalog
//! entities (roles, permissions, modules, forms) can be looked up by their
//! natural key. [`AuditingStore`] wraps any store and stamps the audit
//! columns of every pending change before delegating the commit.

use std::fmt;

use async_trait::async_trait;
use sea_orm::prelude::DateTimeUtc;
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, DbErr, Value};
use serde::{Deserialize, Serialize};

use crate::entity::{
    form, form_module, module, permission, person, role, role_form_permission, role_user, user,
    Lifecycle,
};
use crate::error::StoreError;

/// Expands `$body` once per [`Tracked`] variant with `$am` bound to the inner
/// active model.
macro_rules! for_each_tracked {
    ($value:expr, $am:ident => $body:expr) => {
        match $value {
            Tracked::Role($am) => $body,
            Tracked::Permission($am) => $body,
            Tracked::Module($am) => $body,
            Tracked::Form($am) => $body,
            Tracked::Person($am) => $body,
            Tracked::User($am) => $body,
            Tracked::RoleUser($am) => $body,
            Tracked::RoleFormPermission($am) => $body,
            Tracked::FormModule($am) => $body,
        }
    };
}

mod audit;
mod auditing;
mod database;
mod memory;

pub use audit::{AuditVisitor, Audited, Clock, FixedClock, SystemClock, TimestampAudit};
pub use auditing::AuditingStore;
pub use database::DatabaseStore;
pub use memory::MemoryStore;

/// Catalog entity kinds, i.e. the tables with a natural key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Role,
    Permission,
    Module,
    Form,
}

impl CatalogKind {
    /// Seeding order
    pub const ALL: [CatalogKind; 4] = [
        CatalogKind::Role,
        CatalogKind::Permission,
        CatalogKind::Module,
        CatalogKind::Form,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            CatalogKind::Role => "sec_role",
            CatalogKind::Permission => "sec_permission",
            CatalogKind::Module => "sec_module",
            CatalogKind::Form => "sec_form",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CatalogKind::Role => "role",
            CatalogKind::Permission => "permission",
            CatalogKind::Module => "module",
            CatalogKind::Form => "form",
        };
        f.write_str(label)
    }
}

/// A persisted catalog row as seen by natural-key lookups
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRow {
    pub id: i64,
    pub kind: CatalogKind,
    pub key: String,
    pub create_at: DateTimeUtc,
    pub lifecycle: Lifecycle,
}

impl From<role::Model> for StoredRow {
    fn from(m: role::Model) -> Self {
        Self {
            id: m.id,
            kind: CatalogKind::Role,
            lifecycle: m.lifecycle(),
            key: m.name,
            create_at: m.create_at,
        }
    }
}

impl From<permission::Model> for StoredRow {
    fn from(m: permission::Model) -> Self {
        Self {
            id: m.id,
            kind: CatalogKind::Permission,
            lifecycle: m.lifecycle(),
            key: m.code,
            create_at: m.create_at,
        }
    }
}

impl From<module::Model> for StoredRow {
    fn from(m: module::Model) -> Self {
        Self {
            id: m.id,
            kind: CatalogKind::Module,
            lifecycle: m.lifecycle(),
            key: m.name,
            create_at: m.create_at,
        }
    }
}

impl From<form::Model> for StoredRow {
    fn from(m: form::Model) -> Self {
        Self {
            id: m.id,
            kind: CatalogKind::Form,
            lifecycle: m.lifecycle(),
            key: m.code,
            create_at: m.create_at,
        }
    }
}

/// State of a pending change inside the unit of work
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityState {
    Created,
    Modified,
    Deleted,
}

/// An active model of any table the store knows how to write
#[derive(Clone, Debug, PartialEq)]
pub enum Tracked {
    Role(role::ActiveModel),
    Permission(permission::ActiveModel),
    Module(module::ActiveModel),
    Form(form::ActiveModel),
    Person(person::ActiveModel),
    User(user::ActiveModel),
    RoleUser(role_user::ActiveModel),
    RoleFormPermission(role_form_permission::ActiveModel),
    FormModule(form_module::ActiveModel),
}

/// Value held by an active field, whether freshly set or loaded
pub(crate) fn current<V: Into<Value>>(value: &ActiveValue<V>) -> Option<&V> {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v),
        ActiveValue::NotSet => None,
    }
}

impl Tracked {
    pub fn table_name(&self) -> &'static str {
        match self {
            Tracked::Role(_) => "sec_role",
            Tracked::Permission(_) => "sec_permission",
            Tracked::Module(_) => "sec_module",
            Tracked::Form(_) => "sec_form",
            Tracked::Person(_) => "sec_person",
            Tracked::User(_) => "sec_user",
            Tracked::RoleUser(_) => "sec_role_user",
            Tracked::RoleFormPermission(_) => "sec_role_form_permission",
            Tracked::FormModule(_) => "sec_form_module",
        }
    }

    pub fn kind(&self) -> Option<CatalogKind> {
        match self {
            Tracked::Role(_) => Some(CatalogKind::Role),
            Tracked::Permission(_) => Some(CatalogKind::Permission),
            Tracked::Module(_) => Some(CatalogKind::Module),
            Tracked::Form(_) => Some(CatalogKind::Form),
            _ => None,
        }
    }

    /// Natural key of a catalog record, if it has been assigned
    pub fn natural_key(&self) -> Option<&str> {
        let key = match self {
            Tracked::Role(am) => current(&am.name),
            Tracked::Permission(am) => current(&am.code),
            Tracked::Module(am) => current(&am.name),
            Tracked::Form(am) => current(&am.code),
            _ => None,
        };
        key.map(String::as_str)
    }

    pub fn id(&self) -> Option<i64> {
        for_each_tracked!(self, am => current(&am.id).copied())
    }

    pub(crate) fn assign_id(&mut self, id: i64) {
        for_each_tracked!(self, am => am.id = ActiveValue::Unchanged(id))
    }

    pub fn audited(&self) -> &dyn Audited {
        for_each_tracked!(self, am => am as &dyn Audited)
    }

    pub fn audited_mut(&mut self) -> &mut dyn Audited {
        for_each_tracked!(self, am => am as &mut dyn Audited)
    }

    /// Lookup view of a catalog record
    pub fn stored_row(&self) -> Option<StoredRow> {
        let audited = self.audited();
        Some(StoredRow {
            id: self.id()?,
            kind: self.kind()?,
            key: self.natural_key()?.to_string(),
            create_at: audited.create_at()?,
            lifecycle: Lifecycle::from(audited.delete_at().flatten()),
        })
    }

    /// Write the record: inserts for created rows, updates otherwise.
    /// Deletes are soft, so they arrive here already turned into updates.
    pub(crate) async fn write<C>(self, state: EntityState, db: &C) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        for_each_tracked!(self, am => {
            match state {
                EntityState::Created => {
                    am.insert(db).await?;
                }
                EntityState::Modified | EntityState::Deleted => {
                    am.update(db).await?;
                }
            }
        });
        Ok(())
    }
}

/// A staged change waiting for the next commit
#[derive(Clone, Debug, PartialEq)]
pub struct PendingChange {
    pub state: EntityState,
    pub record: Tracked,
}

impl PendingChange {
    pub fn created(record: Tracked) -> Self {
        Self {
            state: EntityState::Created,
            record,
        }
    }

    pub fn modified(record: Tracked) -> Self {
        Self {
            state: EntityState::Modified,
            record,
        }
    }

    pub fn deleted(record: Tracked) -> Self {
        Self {
            state: EntityState::Deleted,
            record,
        }
    }
}

/// Capability set the seeder and the audit layer need from a backing store
#[async_trait]
pub trait Store: Send + Sync {
    /// Find one catalog row by natural key, live or soft-deleted
    async fn find_by_key(
        &self,
        kind: CatalogKind,
        key: &str,
    ) -> Result<Option<StoredRow>, StoreError>;

    fn stage(&mut self, change: PendingChange);

    fn pending(&self) -> &[PendingChange];

    fn pending_mut(&mut self) -> &mut [PendingChange];

    /// Write every pending change, returning the number of affected rows.
    /// The pending list is consumed whether the commit succeeds or not.
    async fn commit(&mut self) -> Result<u64, StoreError>;

    /// Drop every pending change without writing
    fn discard(&mut self);

    fn stage_insert(&mut self, record: Tracked) {
        self.stage(PendingChange::created(record));
    }
}
