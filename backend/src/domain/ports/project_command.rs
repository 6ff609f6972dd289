//! Driving port for catalog mutations.
//!
//! Every operation takes the acting identity explicitly. Implementations
//! check access before mutating and reconcile author text into
//! associations.

use async_trait::async_trait;

use crate::domain::{Error, Project, ProjectDraft, ProjectId, UserId};

/// Outcome of a create or edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMutation {
    /// The stored project after the mutation.
    pub project: Project,
    /// Author names that matched no registered identity.
    pub unmatched_authors: Vec<String>,
}

/// Request to edit an existing project.
#[derive(Debug, Clone)]
pub struct UpdateProjectRequest {
    pub project_id: ProjectId,
    pub draft: ProjectDraft,
    /// Expected revision for optimistic concurrency.
    ///
    /// - `None` applies the edit unconditionally (last write wins).
    /// - `Some(n)` fails with `Conflict` unless the stored revision is `n`.
    pub expected_revision: Option<u32>,
}

/// Catalog mutations exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectCommand: Send + Sync {
    /// Submit a new project. The actor is always associated as an author.
    async fn create_project(
        &self,
        actor: &UserId,
        draft: ProjectDraft,
    ) -> Result<ProjectMutation, Error>;

    /// Edit a project, fully replacing its author associations.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the project does not exist.
    /// - `Forbidden` unless the actor is an author or administrator.
    /// - `Conflict` when `expected_revision` is stale.
    async fn update_project(
        &self,
        actor: &UserId,
        request: UpdateProjectRequest,
    ) -> Result<ProjectMutation, Error>;

    /// Delete a project and, best effort, its attachment.
    async fn delete_project(&self, actor: &UserId, project_id: &ProjectId) -> Result<(), Error>;
}
