//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel row structs and domain types. Rows
//! (`models.rs`) and table definitions (`schema.rs`) stay private to this
//! module. Connections come from a `bb8` pool via `diesel-async`; schema
//! migrations are embedded and applied at startup.
//!
//! # Example
//!
//! ```ignore
//! use catalog::outbound::persistence::{DbPool, DieselProjectRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/catalog")).await?;
//! let projects = DieselProjectRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_favorite_repository;
mod diesel_project_repository;
mod diesel_upload_ledger;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_favorite_repository::DieselFavoriteRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_upload_ledger::DieselUploadLedger;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
