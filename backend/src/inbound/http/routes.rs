//! Route table for the `/api/v1` scope.

use actix_web::web;

use crate::inbound::http::{admin, favorites, projects, uploads, users};

/// Register every API handler on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use catalog::inbound::http::routes;
///
/// let app = App::new().service(web::scope("/api/v1").configure(routes::configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(projects::list_projects)
        .service(projects::create_project)
        .service(projects::get_project)
        .service(projects::update_project)
        .service(projects::delete_project)
        .service(favorites::toggle_favorite)
        .service(favorites::list_favorites)
        .service(admin::overview)
        .service(admin::sync_authors)
        .service(uploads::upload)
        .service(uploads::download);
}
