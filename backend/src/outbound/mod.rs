//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **blob**: capability-scoped filesystem storage for uploads
//! - **credentials**: Argon2 password hashing
//!
//! Adapters convert between domain types and infrastructure representations
//! and contain no business logic.

pub mod blob;
pub mod credentials;
pub mod persistence;
