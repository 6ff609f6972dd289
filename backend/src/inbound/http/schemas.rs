//! Response bodies for the HTTP adapter.
//!
//! Port result types stay free of transport concerns; these wrappers fix the
//! camelCase JSON shape and register the OpenAPI schemas.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{AdminOverview, ProjectDetail, ProjectMutation, ProjectPage};
use crate::domain::{FavoriteState, FileRef, Project, User};

/// Result of creating or editing a project.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMutationResponse {
    pub project: Project,
    /// Author names that matched no registered user.
    pub unmatched_authors: Vec<String>,
}

impl From<ProjectMutation> for ProjectMutationResponse {
    fn from(value: ProjectMutation) -> Self {
        Self {
            project: value.project,
            unmatched_authors: value.unmatched_authors,
        }
    }
}

/// One page of search results.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPageResponse {
    pub items: Vec<Project>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl From<ProjectPage> for ProjectPageResponse {
    fn from(value: ProjectPage) -> Self {
        let total_pages = value.total_pages();
        Self {
            items: value.items,
            page: value.page,
            per_page: value.per_page,
            total: value.total,
            total_pages,
        }
    }
}

/// Project detail as seen by the current viewer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetailResponse {
    pub project: Project,
    pub authors: Vec<User>,
    pub is_favorite: bool,
    pub can_edit: bool,
}

impl From<ProjectDetail> for ProjectDetailResponse {
    fn from(value: ProjectDetail) -> Self {
        Self {
            project: value.project,
            authors: value.authors,
            is_favorite: value.is_favorite,
            can_edit: value.can_edit,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverviewResponse {
    pub projects: Vec<Project>,
    pub users: Vec<User>,
}

impl From<AdminOverview> for AdminOverviewResponse {
    fn from(value: AdminOverview) -> Self {
        Self {
            projects: value.projects,
            users: value.users,
        }
    }
}

/// Favorite state after a toggle.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggleResponse {
    pub state: FavoriteState,
    pub is_favorite: bool,
}

impl From<FavoriteState> for FavoriteToggleResponse {
    fn from(state: FavoriteState) -> Self {
        Self {
            state,
            is_favorite: state.is_favorited(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_ref: FileRef,
}
