//! Favorite handlers.
//!
//! ```text
//! POST /api/v1/projects/{id}/favorite
//! GET  /api/v1/favorites
//! ```

use actix_web::{get, post, web};

use crate::domain::{Error, Project};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::FavoriteToggleResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_project_id};

/// Flip the favorite mark on a project for the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/favorite",
    params(("id" = String, Path, description = "Project identifier")),
    responses(
        (status = 200, description = "New favorite state", body = FavoriteToggleResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["favorites"],
    operation_id = "toggleFavorite"
)]
#[post("/projects/{id}/favorite")]
pub async fn toggle_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<FavoriteToggleResponse>> {
    let actor = session.require_user_id()?;
    let project_id = parse_project_id(&path.into_inner(), FieldName::new("id"))?;
    let favorite = state.favorites.toggle_favorite(&actor, &project_id).await?;
    Ok(web::Json(favorite.into()))
}

/// Projects the signed-in user marked, most recently favorited first.
#[utoipa::path(
    get,
    path = "/api/v1/favorites",
    responses(
        (status = 200, description = "Favorited projects", body = [Project]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["favorites"],
    operation_id = "listFavorites"
)]
#[get("/favorites")]
pub async fn list_favorites(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Project>>> {
    let actor = session.require_user_id()?;
    let projects = state.favorites_query.list_favorites(&actor).await?;
    Ok(web::Json(projects))
}
