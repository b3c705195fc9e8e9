//! Audit columns and the pre-commit visitor that stamps them

use sea_orm::prelude::DateTimeUtc;
use sea_orm::ActiveValue;

use super::{current, EntityState};
use crate::entity;

/// Access to the bookkeeping columns every entity carries
pub trait Audited: Send {
    fn create_at_mut(&mut self) -> &mut ActiveValue<DateTimeUtc>;
    fn active_mut(&mut self) -> &mut ActiveValue<bool>;
    fn delete_at_mut(&mut self) -> &mut ActiveValue<Option<DateTimeUtc>>;

    fn create_at(&self) -> Option<DateTimeUtc>;
    /// `None` when the column is not part of the change
    fn delete_at(&self) -> Option<Option<DateTimeUtc>>;
}

macro_rules! impl_audited {
    ($($entity:ident),+ $(,)?) => {$(
        impl Audited for entity::$entity::ActiveModel {
            fn create_at_mut(&mut self) -> &mut ActiveValue<DateTimeUtc> {
                &mut self.create_at
            }

            fn active_mut(&mut self) -> &mut ActiveValue<bool> {
                &mut self.active
            }

            fn delete_at_mut(&mut self) -> &mut ActiveValue<Option<DateTimeUtc>> {
                &mut self.delete_at
            }

            fn create_at(&self) -> Option<DateTimeUtc> {
                current(&self.create_at).copied()
            }

            fn delete_at(&self) -> Option<Option<DateTimeUtc>> {
                current(&self.delete_at).copied()
            }
        }
    )+};
}

impl_audited!(
    role,
    permission,
    module,
    form,
    person,
    user,
    role_user,
    role_form_permission,
    form_module,
);

/// Hook run over every pending change right before it is written
pub trait AuditVisitor: Send + Sync {
    fn visit(&self, state: EntityState, entry: &mut dyn Audited, now: DateTimeUtc);
}

/// Default audit policy.
///
/// * created: `create_at` is stamped unless the caller already set it, the
///   row starts live and active
/// * modified: `create_at` is never written
/// * deleted: the row is soft-deleted (`delete_at = now`, `active = false`);
///   a `delete_at` already carried by the change is kept, so a change built
///   from only the id of a deleted row is stamped again
#[derive(Clone, Copy, Debug, Default)]
pub struct TimestampAudit;

impl AuditVisitor for TimestampAudit {
    fn visit(&self, state: EntityState, entry: &mut dyn Audited, now: DateTimeUtc) {
        match state {
            EntityState::Created => {
                if entry.create_at().is_none() {
                    *entry.create_at_mut() = ActiveValue::Set(now);
                }
                if matches!(entry.active_mut(), ActiveValue::NotSet) {
                    *entry.active_mut() = ActiveValue::Set(true);
                }
                if matches!(entry.delete_at_mut(), ActiveValue::NotSet) {
                    *entry.delete_at_mut() = ActiveValue::Set(None);
                }
            }
            EntityState::Modified => {
                *entry.create_at_mut() = ActiveValue::NotSet;
            }
            EntityState::Deleted => {
                *entry.create_at_mut() = ActiveValue::NotSet;
                *entry.active_mut() = ActiveValue::Set(false);
                // a row that is already deleted keeps its original delete time
                if !matches!(entry.delete_at(), Some(Some(_))) {
                    *entry.delete_at_mut() = ActiveValue::Set(Some(now));
                }
            }
        }
    }
}

/// Source of commit timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTimeUtc;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTimeUtc {
        chrono::Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTimeUtc);

impl Clock for FixedClock {
    fn now(&self) -> DateTimeUtc {
        self.0
    }
}
