//! Rbacdesk - role, permission, module and form catalog backend
//!
//! This crate provides the entity models, the audited unit-of-work store,
//! the idempotent catalog seeder and the HTTP API that exposes the catalog.

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod seed;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
