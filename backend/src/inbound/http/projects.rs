//! Project catalog handlers.
//!
//! ```text
//! GET    /api/v1/projects?q=robot&page=2
//! POST   /api/v1/projects {"title":"…","description":"…","authors":"Ana, Bruno"}
//! GET    /api/v1/projects/{id}
//! PUT    /api/v1/projects/{id} {"title":"…","description":"…","authors":"Ana","expectedRevision":3}
//! DELETE /api/v1/projects/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::ports::{ProjectSearch, UpdateProjectRequest};
use crate::domain::{Error, ProjectDraft, ProjectId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ProjectDetailResponse, ProjectMutationResponse, ProjectPageResponse,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_optional_file_ref, parse_project_id, project_error,
};

const FILE_REF: FieldName = FieldName::new("fileRef");
const PROJECT_ID: FieldName = FieldName::new("id");

/// Search parameters for `GET /api/v1/projects`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListProjectsParams {
    /// Case-insensitive substring matched against title, description, and
    /// authors.
    pub q: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
}

/// Create or edit body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub title: String,
    pub description: String,
    /// Comma-separated author names.
    pub authors: String,
    /// Reference returned by `POST /api/v1/uploads`. Omit to keep the
    /// current attachment on edit.
    #[serde(default)]
    pub file_ref: Option<String>,
    /// Revision the client last read. Omit for last-write-wins.
    #[serde(default)]
    pub expected_revision: Option<u32>,
}

impl ProjectRequest {
    fn into_draft(self) -> Result<(ProjectDraft, Option<u32>), Error> {
        let file_ref = parse_optional_file_ref(self.file_ref, FILE_REF)?;
        let draft = ProjectDraft::try_new(&self.title, &self.description, &self.authors, file_ref)
            .map_err(project_error)?;
        Ok((draft, self.expected_revision))
    }
}

fn project_id(path: web::Path<String>) -> Result<ProjectId, Error> {
    parse_project_id(&path.into_inner(), PROJECT_ID)
}

/// Search the catalog, newest first, ten per page.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    params(ListProjectsParams),
    responses(
        (status = 200, description = "Matching projects", body = ProjectPageResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["projects"],
    operation_id = "listProjects",
    security([])
)]
#[get("/projects")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    params: web::Query<ListProjectsParams>,
) -> ApiResult<web::Json<ProjectPageResponse>> {
    let ListProjectsParams { q, page } = params.into_inner();
    let page = state
        .projects_query
        .search_projects(ProjectSearch::new(q, page))
        .await?;
    Ok(web::Json(page.into()))
}

/// Publish a project. Author names are matched against registered users.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectMutationResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("/projects")]
pub async fn create_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProjectRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let (draft, _) = payload.into_inner().into_draft()?;
    let mutation = state.projects.create_project(&actor, draft).await?;
    Ok(HttpResponse::Created().json(ProjectMutationResponse::from(mutation)))
}

/// Project detail. Anonymous viewers are allowed.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "Project detail", body = ProjectDetailResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["projects"],
    operation_id = "getProject",
    security([])
)]
#[get("/projects/{id}")]
pub async fn get_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProjectDetailResponse>> {
    let id = project_id(path)?;
    let viewer = session.user_id()?;
    let detail = state.projects_query.get_project(viewer, &id).await?;
    Ok(web::Json(detail.into()))
}

/// Edit a project. Authors are reconciled from scratch against the new text.
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project identifier")),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectMutationResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an author or administrator", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Stale expectedRevision", body = Error)
    ),
    tags = ["projects"],
    operation_id = "updateProject"
)]
#[put("/projects/{id}")]
pub async fn update_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ProjectRequest>,
) -> ApiResult<web::Json<ProjectMutationResponse>> {
    let actor = session.require_user_id()?;
    let project_id = project_id(path)?;
    let (draft, expected_revision) = payload.into_inner().into_draft()?;
    let mutation = state
        .projects
        .update_project(
            &actor,
            UpdateProjectRequest {
                project_id,
                draft,
                expected_revision,
            },
        )
        .await?;
    Ok(web::Json(mutation.into()))
}

/// Delete a project together with its associations and favorites.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = String, Path, description = "Project identifier")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an author or administrator", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["projects"],
    operation_id = "deleteProject"
)]
#[delete("/projects/{id}")]
pub async fn delete_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let project_id = project_id(path)?;
    state.projects.delete_project(&actor, &project_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "projects_tests.rs"]
mod tests;
