//! Driving port for catalog reads.

use async_trait::async_trait;

use crate::domain::{Error, Project, ProjectId, User, UserId};

/// Projects per listing page.
pub const PROJECTS_PER_PAGE: u32 = 10;

/// Search parameters. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSearch {
    pub q: Option<String>,
    pub page: u32,
}

impl ProjectSearch {
    /// Build a search, clamping the page to at least 1.
    pub fn new(q: Option<String>, page: Option<u32>) -> Self {
        Self {
            q,
            page: page.unwrap_or(1).max(1),
        }
    }

    /// Trimmed search text, or `None` when blank.
    pub fn needle(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPage {
    pub items: Vec<Project>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl ProjectPage {
    /// Number of non-empty pages.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page))
    }
}

/// A project as shown to a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetail {
    pub project: Project,
    /// Associated authors ordered by display name.
    pub authors: Vec<User>,
    /// Whether the viewer has favorited the project. Always false for
    /// anonymous viewers.
    pub is_favorite: bool,
    /// Whether the viewer may edit or delete the project.
    pub can_edit: bool,
}

/// Catalog reads exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectQuery: Send + Sync {
    /// Load a project for an optional viewer.
    async fn get_project(
        &self,
        viewer: Option<UserId>,
        project_id: &ProjectId,
    ) -> Result<ProjectDetail, Error>;

    /// List projects newest first, optionally filtered. Out-of-range pages
    /// are empty rather than errors.
    async fn search_projects(&self, search: ProjectSearch) -> Result<ProjectPage, Error>;
}
