//! SeaORM-backed store

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};

use super::{CatalogKind, PendingChange, Store, StoredRow};
use crate::entity::{form, module, permission, role};
use crate::error::StoreError;

/// Unit of work over a database connection pool.
///
/// Staged changes are written in a single transaction on commit.
pub struct DatabaseStore {
    db: DatabaseConnection,
    pending: Vec<PendingChange>,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            pending: Vec::new(),
        }
    }
}

#[async_trait]
impl Store for DatabaseStore {
    async fn find_by_key(
        &self,
        kind: CatalogKind,
        key: &str,
    ) -> Result<Option<StoredRow>, StoreError> {
        let row = match kind {
            CatalogKind::Role => role::Entity::find()
                .filter(role::Column::Name.eq(key))
                .one(&self.db)
                .await?
                .map(StoredRow::from),
            CatalogKind::Permission => permission::Entity::find()
                .filter(permission::Column::Code.eq(key))
                .one(&self.db)
                .await?
                .map(StoredRow::from),
            CatalogKind::Module => module::Entity::find()
                .filter(module::Column::Name.eq(key))
                .one(&self.db)
                .await?
                .map(StoredRow::from),
            CatalogKind::Form => form::Entity::find()
                .filter(form::Column::Code.eq(key))
                .one(&self.db)
                .await?
                .map(StoredRow::from),
        };
        Ok(row)
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
        if changes.is_empty() {
            return Ok(0);
        }

        // Dropping the transaction on error rolls it back
        let txn = self.db.begin().await?;
        let mut affected = 0;
        for change in changes {
            change.record.write(change.state, &txn).await?;
            affected += 1;
        }
        txn.commit().await?;

        Ok(affected)
    }

    fn discard(&mut self) {
        self.pending.clear();
    }
}
