//! Driven port for project persistence.
//!
//! A project row and its `project_authors` associations are always written
//! together, inside one transaction, so readers never observe a partially
//! replaced author set.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::{Project, ProjectId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by project repository adapters.
    pub enum ProjectPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "project repository query failed: {message}",
        /// The project row no longer exists.
        NotFound { id: ProjectId } => "project {id} not found",
        /// A conditional update saw a different stored revision.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
    }
}

/// Text filter and window for project listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSearchQuery {
    /// Case-insensitive substring matched against title, description, and
    /// authors text. `None` lists everything.
    pub needle: Option<String>,
    pub offset: u64,
    pub limit: u64,
}

/// One window of a project listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSlice {
    pub items: Vec<Project>,
    /// Matches across all windows.
    pub total: u64,
}

/// Catalog store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a project together with its author associations.
    async fn insert(&self, project: &Project) -> Result<(), ProjectPersistenceError>;

    /// Overwrite the editable fields and replace the author set atomically.
    ///
    /// When `expected_revision` is given the write only happens if the stored
    /// revision still matches. On success the stored revision is incremented
    /// and returned.
    async fn replace(
        &self,
        project: &Project,
        expected_revision: Option<u32>,
    ) -> Result<u32, ProjectPersistenceError>;

    /// Delete a project. Favorites and associations cascade. Returns whether
    /// a row was removed.
    async fn delete(&self, id: &ProjectId) -> Result<bool, ProjectPersistenceError>;

    /// Fetch a project with its author ids.
    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectPersistenceError>;

    /// Fetch several projects; missing ids are skipped, order is unspecified.
    async fn find_many(&self, ids: &[ProjectId]) -> Result<Vec<Project>, ProjectPersistenceError>;

    /// Filtered listing ordered by `created_at` descending.
    async fn search(
        &self,
        query: &ProjectSearchQuery,
    ) -> Result<ProjectSlice, ProjectPersistenceError>;

    /// Every project, newest first.
    async fn list_all(&self) -> Result<Vec<Project>, ProjectPersistenceError>;

    /// Add associations without touching existing ones. Returns how many
    /// were newly inserted.
    async fn add_authors(
        &self,
        id: &ProjectId,
        authors: &BTreeSet<UserId>,
    ) -> Result<usize, ProjectPersistenceError>;
}
