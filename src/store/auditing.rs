//! Audit-stamping commit wrapper

use std::sync::Arc;

use sea_orm::prelude::DateTimeUtc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{
    AuditVisitor, CatalogKind, Clock, PendingChange, Store, StoredRow, SystemClock,
    TimestampAudit, Tracked,
};
use crate::error::StoreError;

/// Store wrapper that runs the audit visitor over the unit of work before
/// every commit, so call sites never stamp audit columns themselves.
pub struct AuditingStore<S> {
    inner: S,
    visitor: Arc<dyn AuditVisitor>,
    clock: Arc<dyn Clock>,
}

impl<S: Store> AuditingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            visitor: Arc::new(TimestampAudit),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_visitor(mut self, visitor: impl AuditVisitor + 'static) -> Self {
        self.visitor = Arc::new(visitor);
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Current time according to the store clock
    pub fn now(&self) -> DateTimeUtc {
        self.clock.now()
    }

    pub async fn find_by_key(
        &self,
        kind: CatalogKind,
        key: &str,
    ) -> Result<Option<StoredRow>, StoreError> {
        self.inner.find_by_key(kind, key).await
    }

    pub fn stage_insert(&mut self, record: Tracked) {
        self.inner.stage(PendingChange::created(record));
    }

    pub fn stage_update(&mut self, record: Tracked) {
        self.inner.stage(PendingChange::modified(record));
    }

    /// Stage a soft delete. The record only needs its primary key.
    pub fn stage_delete(&mut self, record: Tracked) {
        self.inner.stage(PendingChange::deleted(record));
    }

    pub fn pending(&self) -> &[PendingChange] {
        self.inner.pending()
    }

    pub fn discard(&mut self) {
        self.inner.discard();
    }

    fn stamp_pending(&mut self) {
        let now = self.clock.now();
        let visitor = Arc::clone(&self.visitor);
        for change in self.inner.pending_mut() {
            visitor.visit(change.state, change.record.audited_mut(), now);
        }
    }

    /// Stamp and write every pending change
    pub async fn commit(&mut self) -> Result<u64, StoreError> {
        self.stamp_pending();
        debug!("Committing {} pending changes", self.inner.pending().len());
        self.inner.commit().await
    }

    /// Like [`commit`](Self::commit), but refuses to start once `cancel` has
    /// fired. A cancelled call writes nothing and leaves the pending changes
    /// staged.
    pub async fn commit_cancellable(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::OperationCancelled);
        }
        self.stamp_pending();
        if cancel.is_cancelled() {
            return Err(StoreError::OperationCancelled);
        }
        debug!("Committing {} pending changes", self.inner.pending().len());
        self.inner.commit().await
    }
}
