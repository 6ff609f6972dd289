//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountsCommand, AdminQuery, AuthorSyncCommand, FavoritesCommand, FavoritesQuery,
    LoginService, ProjectCommand, ProjectQuery, UploadsCommand, UserProfileQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountsCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub projects: Arc<dyn ProjectCommand>,
    pub projects_query: Arc<dyn ProjectQuery>,
    pub admin: Arc<dyn AdminQuery>,
    pub favorites: Arc<dyn FavoritesCommand>,
    pub favorites_query: Arc<dyn FavoritesQuery>,
    pub author_sync: Arc<dyn AuthorSyncCommand>,
    pub uploads: Arc<dyn UploadsCommand>,
}
