//! Administrator handlers.
//!
//! ```text
//! GET  /api/v1/admin
//! POST /api/v1/admin/sync-authors
//! ```

use actix_web::{get, post, web};
use tracing::info;

use crate::domain::{AuthorSyncReport, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::AdminOverviewResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Every project and every user, for administrators only.
#[utoipa::path(
    get,
    path = "/api/v1/admin",
    responses(
        (status = 200, description = "Catalog overview", body = AdminOverviewResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Administrator required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminOverview"
)]
#[get("/admin")]
pub async fn overview(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AdminOverviewResponse>> {
    let actor = session.require_user_id()?;
    let overview = state.admin.admin_overview(&actor).await?;
    Ok(web::Json(overview.into()))
}

/// Run the batch author reconciliation pass.
#[utoipa::path(
    post,
    path = "/api/v1/admin/sync-authors",
    responses(
        (status = 200, description = "Pass report", body = AuthorSyncReport),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Administrator required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "syncAuthors"
)]
#[post("/admin/sync-authors")]
pub async fn sync_authors(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AuthorSyncReport>> {
    let actor = session.require_user_id()?;
    let report = state.author_sync.sync_authors(&actor).await?;
    info!(
        actor = %actor,
        created = report.associations_created,
        unmatched = report.submissions_with_no_match,
        "author sync requested over HTTP"
    );
    Ok(web::Json(report))
}
