use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::seed::Catalog;
use crate::store::{AuditingStore, DatabaseStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Application configuration
    pub config: Arc<Config>,
    /// Catalog seeded at startup; its roles are built in
    pub catalog: Arc<Catalog>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: DatabaseConnection, config: Config, catalog: Catalog) -> Self {
        Self {
            db,
            config: Arc::new(config),
            catalog: Arc::new(catalog),
        }
    }

    /// Open a fresh audited unit of work
    pub fn unit_of_work(&self) -> AuditingStore<DatabaseStore> {
        AuditingStore::new(DatabaseStore::new(self.db.clone()))
    }
}
