//! Batch author reconciliation.
//!
//! Walks every project with author text and adds associations for names that
//! now match a registered identity. Existing associations are never removed,
//! so running the pass twice against an unchanged identity store creates
//! nothing the second time. A project counts towards
//! `submissions_with_no_match` whenever the pass links nobody new to it,
//! including projects whose authors were all linked already.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::access::ensure_admin;
use crate::domain::authors::{ReconcileMode, reconcile_authors, split_author_names};
use crate::domain::ports::{AuthorSyncCommand, ProjectRepository, UserRepository};
use crate::domain::service_support::{map_project_error, map_user_error, require_actor};
use crate::domain::{Error, UserId};

/// Summary of one batch pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSyncReport {
    /// Associations inserted by this pass.
    pub associations_created: usize,
    /// Projects with author text that gained no association in this pass.
    pub submissions_with_no_match: usize,
    /// One diagnostic line per processed project.
    pub lines: Vec<String>,
}

/// Batch reconciliation service.
#[derive(Clone)]
pub struct AuthorSyncService<U, P> {
    users: Arc<U>,
    projects: Arc<P>,
}

impl<U, P> AuthorSyncService<U, P> {
    pub fn new(users: Arc<U>, projects: Arc<P>) -> Self {
        Self { users, projects }
    }
}

impl<U, P> AuthorSyncService<U, P>
where
    U: UserRepository,
    P: ProjectRepository,
{
    /// Run the pass without an access check. Used by the command-line tool.
    pub async fn run(&self) -> Result<AuthorSyncReport, Error> {
        let known = self
            .users
            .list_identities()
            .await
            .map_err(map_user_error)?;
        let projects = self
            .projects
            .list_all()
            .await
            .map_err(map_project_error)?;

        let mut report = AuthorSyncReport::default();
        for project in projects {
            if split_author_names(&project.authors_text).is_empty() {
                continue;
            }

            let reconciliation = reconcile_authors(
                &project.authors_text,
                &known,
                &project.author_ids,
                ReconcileMode::Additive,
            );
            let created = if reconciliation.added.is_empty() {
                0
            } else {
                self.projects
                    .add_authors(&project.id, &reconciliation.added)
                    .await
                    .map_err(map_project_error)?
            };
            report.associations_created += created;
            if created == 0 {
                report.submissions_with_no_match += 1;
            }

            let line = if reconciliation.unmatched.is_empty() {
                format!("{} ({}): +{created}", project.title, project.id)
            } else {
                format!(
                    "{} ({}): +{created}, unmatched: {}",
                    project.title,
                    project.id,
                    reconciliation.unmatched.join(", ")
                )
            };
            info!(project_id = %project.id, created, "{line}");
            report.lines.push(line);
        }

        info!(
            associations_created = report.associations_created,
            submissions_with_no_match = report.submissions_with_no_match,
            "author sync finished"
        );
        Ok(report)
    }
}

#[async_trait]
impl<U, P> AuthorSyncCommand for AuthorSyncService<U, P>
where
    U: UserRepository,
    P: ProjectRepository,
{
    async fn sync_authors(&self, actor: &UserId) -> Result<AuthorSyncReport, Error> {
        let actor = require_actor(self.users.as_ref(), actor).await?;
        ensure_admin(&actor)?;
        self.run().await
    }
}
