//! In-process store
//!
//! Keeps rows as active models keyed by table name. Natural keys are unique
//! per catalog table, like the unique columns of the SQL schema.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue, EntityTrait, Iterable};

use super::{CatalogKind, EntityState, PendingChange, Store, StoredRow, Tracked};
use crate::error::StoreError;

#[derive(Default)]
pub struct MemoryStore {
    tables: HashMap<&'static str, Vec<Tracked>>,
    pending: Vec<PendingChange>,
    next_id: i64,
    commits: usize,
    writes: u64,
    failing_lookups: Option<CatalogKind>,
}

/// Copy every column written by `change` onto `target`
fn merge<A: ActiveModelTrait>(target: &mut A, change: &A) {
    for column in <A::Entity as EntityTrait>::Column::iter() {
        if let ActiveValue::Set(value) = change.get(column) {
            target.set(column, value);
        }
    }
}

fn merge_tracked(target: &mut Tracked, change: &Tracked) {
    match (target, change) {
        (Tracked::Role(t), Tracked::Role(c)) => merge(t, c),
        (Tracked::Permission(t), Tracked::Permission(c)) => merge(t, c),
        (Tracked::Module(t), Tracked::Module(c)) => merge(t, c),
        (Tracked::Form(t), Tracked::Form(c)) => merge(t, c),
        (Tracked::Person(t), Tracked::Person(c)) => merge(t, c),
        (Tracked::User(t), Tracked::User(c)) => merge(t, c),
        (Tracked::RoleUser(t), Tracked::RoleUser(c)) => merge(t, c),
        (Tracked::RoleFormPermission(t), Tracked::RoleFormPermission(c)) => merge(t, c),
        (Tracked::FormModule(t), Tracked::FormModule(c)) => merge(t, c),
        // rows are looked up by table name, so variants always match
        _ => {}
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every lookup of `kind` fail with [`StoreError::Unavailable`]
    pub fn failing_lookups(mut self, kind: CatalogKind) -> Self {
        self.failing_lookups = Some(kind);
        self
    }

    pub fn rows(&self, table: &str) -> &[Tracked] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn catalog_rows(&self, kind: CatalogKind) -> Vec<StoredRow> {
        self.rows(kind.table_name())
            .iter()
            .filter_map(Tracked::stored_row)
            .collect()
    }

    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// Rows written over the lifetime of the store
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Whether a row other than `except` already holds `key`
    fn key_taken(&self, kind: CatalogKind, key: &str, except: Option<i64>) -> bool {
        self.rows(kind.table_name())
            .iter()
            .any(|row| row.natural_key() == Some(key) && row.id() != except)
    }

    fn has_row(&self, table: &str, id: i64) -> bool {
        self.rows(table).iter().any(|row| row.id() == Some(id))
    }

    /// Reject the whole change set before applying any of it
    fn validate(&self, changes: &[PendingChange]) -> Result<(), StoreError> {
        let mut staged_keys = HashSet::new();
        for change in changes {
            let table = change.record.table_name();
            let id = match change.state {
                EntityState::Created => None,
                EntityState::Modified | EntityState::Deleted => {
                    let id = change
                        .record
                        .id()
                        .ok_or(StoreError::MissingPrimaryKey(table))?;
                    if !self.has_row(table, id) {
                        return Err(StoreError::MissingRow { table, id });
                    }
                    Some(id)
                }
            };

            // an update may rename the row, so its key is checked like an insert
            if let (Some(kind), Some(key)) = (change.record.kind(), change.record.natural_key()) {
                if self.key_taken(kind, key, id) || !staged_keys.insert((kind, key)) {
                    return Err(StoreError::Conflict {
                        table,
                        key: key.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_by_key(
        &self,
        kind: CatalogKind,
        key: &str,
    ) -> Result<Option<StoredRow>, StoreError> {
        if self.failing_lookups == Some(kind) {
            return Err(StoreError::Unavailable(format!("{} lookup failed", kind)));
        }
        Ok(self
            .catalog_rows(kind)
            .into_iter()
            .find(|row| row.key == key))
    }

    fn stage(&mut self, change: PendingChange) {
        self.pending.push(change);
    }

    fn pending(&self) -> &[PendingChange] {
        &self.pending
    }

    fn pending_mut(&mut self) -> &mut [PendingChange] {
        &mut self.pending
    }

    async fn commit(&mut self) -> Result<u64, StoreError> {
        let changes = std::mem::take(&mut self.pending);
        self.validate(&changes)?;

        let mut affected = 0;
        for change in changes {
            let table = change.record.table_name();
            match change.state {
                EntityState::Created => {
                    let mut record = change.record;
                    self.next_id += 1;
                    record.assign_id(self.next_id);
                    self.tables.entry(table).or_default().push(record);
                }
                EntityState::Modified | EntityState::Deleted => {
                    let id = change.record.id();
                    if let Some(row) = self
                        .tables
                        .get_mut(table)
                        .and_then(|rows| rows.iter_mut().find(|row| row.id() == id))
                    {
                        merge_tracked(row, &change.record);
                    }
                }
            }
            affected += 1;
        }

        self.writes += affected;
        self.commits += 1;
        Ok(affected)
    }

    fn discard(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{module, permission};
    use sea_orm::Set;

    fn permission_row(code: &str) -> Tracked {
        Tracked::Permission(permission::ActiveModel {
            code: Set(code.to_string()),
            name: Set(code.to_lowercase()),
            description: Set(String::new()),
            active: Set(true),
            create_at: Set(chrono::Utc::now()),
            delete_at: Set(None),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_commit_and_lookup() {
        let mut store = MemoryStore::new();
        store.stage_insert(permission_row("READ"));
        store.stage_insert(permission_row("WRITE"));

        assert_eq!(store.commit().await.unwrap(), 2);
        assert_eq!(store.commit_count(), 1);
        assert!(store.pending().is_empty());

        let found = store
            .find_by_key(CatalogKind::Permission, "WRITE")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, 2);
        assert!(store
            .find_by_key(CatalogKind::Permission, "DELETE")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_key(CatalogKind::Role, "READ")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_key_rejects_whole_commit() {
        let mut store = MemoryStore::new();
        store.stage_insert(permission_row("READ"));
        store.commit().await.unwrap();

        store.stage_insert(permission_row("WRITE"));
        store.stage_insert(permission_row("READ"));
        let err = store.commit().await.unwrap_err();

        assert!(matches!(err, StoreError::Conflict { table: "sec_permission", .. }));
        assert_eq!(store.catalog_rows(CatalogKind::Permission).len(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_rename_onto_taken_key() {
        let mut store = MemoryStore::new();
        store.stage_insert(permission_row("READ"));
        store.stage_insert(permission_row("WRITE"));
        store.commit().await.unwrap();

        store.stage(PendingChange::modified(Tracked::Permission(permission::ActiveModel {
            id: ActiveValue::Unchanged(2),
            code: Set("READ".to_string()),
            ..Default::default()
        })));
        let err = store.commit().await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { table: "sec_permission", .. }));

        let mut codes: Vec<_> = store
            .catalog_rows(CatalogKind::Permission)
            .into_iter()
            .map(|row| row.key)
            .collect();
        codes.sort();
        assert_eq!(codes, vec!["READ", "WRITE"]);
    }

    #[tokio::test]
    async fn test_update_keeping_own_key() {
        let mut store = MemoryStore::new();
        store.stage_insert(permission_row("READ"));
        store.commit().await.unwrap();

        store.stage(PendingChange::modified(Tracked::Permission(permission::ActiveModel {
            id: ActiveValue::Unchanged(1),
            code: Set("READ".to_string()),
            description: Set("read access".to_string()),
            ..Default::default()
        })));
        assert_eq!(store.commit().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rename_onto_key_staged_in_same_commit() {
        let mut store = MemoryStore::new();
        store.stage_insert(permission_row("READ"));
        store.commit().await.unwrap();

        store.stage_insert(permission_row("EXPORT"));
        store.stage(PendingChange::modified(Tracked::Permission(permission::ActiveModel {
            id: ActiveValue::Unchanged(1),
            code: Set("EXPORT".to_string()),
            ..Default::default()
        })));
        let err = store.commit().await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.catalog_rows(CatalogKind::Permission).len(), 1);
    }

    #[tokio::test]
    async fn test_update_of_missing_row() {
        let mut store = MemoryStore::new();
        store.stage(PendingChange::modified(Tracked::Module(module::ActiveModel {
            id: ActiveValue::Unchanged(42),
            ..Default::default()
        })));

        let err = store.commit().await.unwrap_err();
        assert!(matches!(err, StoreError::MissingRow { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_failing_lookups() {
        let store = MemoryStore::new().failing_lookups(CatalogKind::Form);
        assert!(store.find_by_key(CatalogKind::Role, "Admin").await.is_ok());
        assert!(matches!(
            store.find_by_key(CatalogKind::Form, "LOGIN_FORM").await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
