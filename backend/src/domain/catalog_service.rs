//! Catalog domain service.
//!
//! Implements project creation, editing, deletion, reads, search, and the
//! administrator overview. Mutations resolve the acting identity, evaluate
//! access, then reconcile author text before touching the store.
//!
//! An attachment must be an unclaimed upload made by the acting user. The
//! project claims it, so a blob belongs to at most one project and removing
//! a project's file never touches anyone else's.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::access::{can_mutate, ensure_admin, ensure_can_mutate};
use crate::domain::attachments::{claim_upload, release_upload};
use crate::domain::authors::{AuthorReconciliation, ReconcileMode, reconcile_authors};
use crate::domain::ports::{
    AdminOverview, AdminQuery, BlobStore, FavoriteRepository, PROJECTS_PER_PAGE, ProjectCommand,
    ProjectDetail, ProjectMutation, ProjectPage, ProjectQuery, ProjectRepository, ProjectSearch,
    ProjectSearchQuery, UpdateProjectRequest, UploadLedger, UserRepository,
};
use crate::domain::service_support::{
    map_favorite_error, map_project_error, map_user_error, require_actor,
};
use crate::domain::{Error, FileRef, Project, ProjectDraft, ProjectId, User, UserId};

/// Catalog service implementing the project driving ports.
#[derive(Clone)]
pub struct CatalogService<U, P, F, L, B> {
    users: Arc<U>,
    projects: Arc<P>,
    favorites: Arc<F>,
    uploads: Arc<L>,
    blobs: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<U, P, F, L, B> CatalogService<U, P, F, L, B> {
    /// Create a new catalog service.
    pub fn new(
        users: Arc<U>,
        projects: Arc<P>,
        favorites: Arc<F>,
        uploads: Arc<L>,
        blobs: Arc<B>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            projects,
            favorites,
            uploads,
            blobs,
            clock,
        }
    }
}

impl<U, P, F, L, B> CatalogService<U, P, F, L, B>
where
    U: UserRepository,
    P: ProjectRepository,
    F: FavoriteRepository,
    L: UploadLedger,
    B: BlobStore,
{
    async fn load_project(&self, project_id: &ProjectId) -> Result<Project, Error> {
        self.projects
            .find_by_id(project_id)
            .await
            .map_err(map_project_error)?
            .ok_or_else(|| Error::not_found(format!("project {project_id} not found")))
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users.find_by_id(id).await.map_err(map_user_error)
    }

    async fn claim_attachment(&self, file_ref: &FileRef, actor: &UserId) -> Result<(), Error> {
        claim_upload(self.uploads.as_ref(), file_ref, Some(*actor), actor, "fileRef").await
    }

    async fn discard_blob(&self, project_id: &ProjectId, file_ref: &FileRef) {
        if let Err(err) = self.uploads.forget(file_ref).await {
            warn!(
                project_id = %project_id,
                file_ref = %file_ref,
                error = %err,
                "failed to drop upload record"
            );
        }
        if let Err(err) = self.blobs.remove(file_ref).await {
            warn!(
                project_id = %project_id,
                file_ref = %file_ref,
                error = %err,
                "failed to remove project attachment"
            );
        }
    }

    async fn reconcile(
        &self,
        draft: &ProjectDraft,
        existing: &BTreeSet<UserId>,
        mode: ReconcileMode,
    ) -> Result<AuthorReconciliation, Error> {
        let known = self
            .users
            .list_identities()
            .await
            .map_err(map_user_error)?;
        Ok(reconcile_authors(draft.authors_text(), &known, existing, mode))
    }
}

#[async_trait]
impl<U, P, F, L, B> ProjectCommand for CatalogService<U, P, F, L, B>
where
    U: UserRepository,
    P: ProjectRepository,
    F: FavoriteRepository,
    L: UploadLedger,
    B: BlobStore,
{
    async fn create_project(
        &self,
        actor: &UserId,
        draft: ProjectDraft,
    ) -> Result<ProjectMutation, Error> {
        let actor = require_actor(self.users.as_ref(), actor).await?;
        let creator = BTreeSet::from([*actor.id()]);
        let reconciliation = self
            .reconcile(&draft, &creator, ReconcileMode::Additive)
            .await?;

        let attachment = draft.file_ref().cloned();
        if let Some(file_ref) = attachment.as_ref() {
            self.claim_attachment(file_ref, actor.id()).await?;
        }

        let project = Project::create(
            ProjectId::random(),
            draft,
            reconciliation.associations,
            self.clock.utc(),
        );
        if let Err(err) = self.projects.insert(&project).await {
            if let Some(file_ref) = attachment.as_ref() {
                release_upload(self.uploads.as_ref(), file_ref).await;
            }
            return Err(map_project_error(err));
        }

        debug!(
            project_id = %project.id,
            authors = project.author_ids.len(),
            unmatched = reconciliation.unmatched.len(),
            "created project"
        );
        Ok(ProjectMutation {
            project,
            unmatched_authors: reconciliation.unmatched,
        })
    }

    async fn update_project(
        &self,
        actor: &UserId,
        request: UpdateProjectRequest,
    ) -> Result<ProjectMutation, Error> {
        let UpdateProjectRequest {
            project_id,
            draft,
            expected_revision,
        } = request;

        let current = self.load_project(&project_id).await?;
        let actor = self.find_user(actor).await?;
        ensure_can_mutate(actor.as_ref(), &current)?;
        let actor = actor.ok_or_else(|| Error::forbidden("login required"))?;

        if let Some(expected) = expected_revision.filter(|rev| *rev != current.revision) {
            return Err(Error::conflict(format!(
                "project was modified concurrently: expected revision {expected}, found {}",
                current.revision
            )));
        }

        let reconciliation = self
            .reconcile(&draft, &current.author_ids, ReconcileMode::Replace)
            .await?;
        let mut next = current.revised(draft, reconciliation.associations);
        let incoming = next
            .file_ref
            .clone()
            .filter(|new| current.file_ref.as_ref() != Some(new));
        if let Some(file_ref) = incoming.as_ref() {
            self.claim_attachment(file_ref, actor.id()).await?;
        }

        next.revision = match self.projects.replace(&next, expected_revision).await {
            Ok(revision) => revision,
            Err(err) => {
                if let Some(file_ref) = incoming.as_ref() {
                    release_upload(self.uploads.as_ref(), file_ref).await;
                }
                return Err(map_project_error(err));
            }
        };

        let replaced = current
            .file_ref
            .as_ref()
            .filter(|old| next.file_ref.as_ref() != Some(*old));
        if let Some(old) = replaced {
            self.discard_blob(&project_id, old).await;
        }

        Ok(ProjectMutation {
            project: next,
            unmatched_authors: reconciliation.unmatched,
        })
    }

    async fn delete_project(&self, actor: &UserId, project_id: &ProjectId) -> Result<(), Error> {
        let project = self.load_project(project_id).await?;
        let actor = self.find_user(actor).await?;
        ensure_can_mutate(actor.as_ref(), &project)?;

        let deleted = self
            .projects
            .delete(project_id)
            .await
            .map_err(map_project_error)?;
        if !deleted {
            return Err(Error::not_found(format!("project {project_id} not found")));
        }

        if let Some(file_ref) = project.file_ref.as_ref() {
            self.discard_blob(project_id, file_ref).await;
        }
        Ok(())
    }
}

#[async_trait]
impl<U, P, F, L, B> ProjectQuery for CatalogService<U, P, F, L, B>
where
    U: UserRepository,
    P: ProjectRepository,
    F: FavoriteRepository,
    L: UploadLedger,
    B: BlobStore,
{
    async fn get_project(
        &self,
        viewer: Option<UserId>,
        project_id: &ProjectId,
    ) -> Result<ProjectDetail, Error> {
        let project = self.load_project(project_id).await?;
        let author_ids: Vec<UserId> = project.author_ids.iter().copied().collect();
        let authors = self
            .users
            .find_many(&author_ids)
            .await
            .map_err(map_user_error)?;

        let viewer = match viewer {
            Some(id) => self.find_user(&id).await?,
            None => None,
        };
        let is_favorite = match viewer.as_ref() {
            Some(user) => self
                .favorites
                .exists(user.id(), project_id)
                .await
                .map_err(map_favorite_error)?,
            None => false,
        };
        let can_edit = can_mutate(viewer.as_ref(), &project);

        Ok(ProjectDetail {
            project,
            authors,
            is_favorite,
            can_edit,
        })
    }

    async fn search_projects(&self, search: ProjectSearch) -> Result<ProjectPage, Error> {
        let page = search.page.max(1);
        let query = ProjectSearchQuery {
            needle: search.needle().map(str::to_owned),
            offset: u64::from(page - 1) * u64::from(PROJECTS_PER_PAGE),
            limit: u64::from(PROJECTS_PER_PAGE),
        };
        let slice = self
            .projects
            .search(&query)
            .await
            .map_err(map_project_error)?;
        Ok(ProjectPage {
            items: slice.items,
            page,
            per_page: PROJECTS_PER_PAGE,
            total: slice.total,
        })
    }
}

#[async_trait]
impl<U, P, F, L, B> AdminQuery for CatalogService<U, P, F, L, B>
where
    U: UserRepository,
    P: ProjectRepository,
    F: FavoriteRepository,
    L: UploadLedger,
    B: BlobStore,
{
    async fn admin_overview(&self, actor: &UserId) -> Result<AdminOverview, Error> {
        let actor = require_actor(self.users.as_ref(), actor).await?;
        ensure_admin(&actor)?;

        let projects = self
            .projects
            .list_all()
            .await
            .map_err(map_project_error)?;
        let users = self.users.list_all().await.map_err(map_user_error)?;
        Ok(AdminOverview { projects, users })
    }
}

#[cfg(test)]
#[path = "catalog_service_tests.rs"]
mod tests;
