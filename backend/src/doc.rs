//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health checks, the
//! response schemas, and the session cookie security scheme. The document
//! backs Swagger UI in debug builds and is exported by the `openapi-dump`
//! binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{AuthorSyncReport, Error, ErrorCode, FavoriteState, Project, User};
use crate::inbound::http::projects::ProjectRequest;
use crate::inbound::http::schemas::{
    AdminOverviewResponse, FavoriteToggleResponse, ProjectDetailResponse,
    ProjectMutationResponse, ProjectPageResponse, UploadResponse,
};
use crate::inbound::http::users::{LoginRequest, RegisterRequest, UpdateProfileRequest};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Project catalog API",
        description = "Accounts, projects with author reconciliation, favorites, and uploads."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::update_project,
        crate::inbound::http::projects::delete_project,
        crate::inbound::http::favorites::toggle_favorite,
        crate::inbound::http::favorites::list_favorites,
        crate::inbound::http::admin::overview,
        crate::inbound::http::admin::sync_authors,
        crate::inbound::http::uploads::upload,
        crate::inbound::http::uploads::download,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Project,
        FavoriteState,
        AuthorSyncReport,
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        ProjectRequest,
        ProjectMutationResponse,
        ProjectPageResponse,
        ProjectDetailResponse,
        AdminOverviewResponse,
        FavoriteToggleResponse,
        UploadResponse,
    )),
    tags(
        (name = "users", description = "Registration, sessions, and profiles"),
        (name = "projects", description = "Catalog entries and their authors"),
        (name = "favorites", description = "Per-user favorite projects"),
        (name = "admin", description = "Administrator overview and author sync"),
        (name = "uploads", description = "Attachment and avatar storage"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
