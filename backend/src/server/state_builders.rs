//! Builders wiring Diesel repositories and adapters into HTTP state.

use std::io;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use catalog::domain::{
    AccountsService, AuthorSyncService, CatalogService, FavoritesService, UploadsService,
};
use catalog::inbound::http::state::HttpState;
use catalog::outbound::blob::CapStdBlobStore;
use catalog::outbound::credentials::Argon2Hasher;
use catalog::outbound::persistence::{
    DbPool, DieselFavoriteRepository, DieselProjectRepository, DieselUploadLedger,
    DieselUserRepository,
};

use super::ServerConfig;

/// Repository handles shared by every service.
struct Repositories {
    users: Arc<DieselUserRepository>,
    projects: Arc<DieselProjectRepository>,
    favorites: Arc<DieselFavoriteRepository>,
    uploads: Arc<DieselUploadLedger>,
}

impl Repositories {
    fn new(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            projects: Arc::new(DieselProjectRepository::new(pool.clone())),
            favorites: Arc::new(DieselFavoriteRepository::new(pool.clone())),
            uploads: Arc::new(DieselUploadLedger::new(pool.clone())),
        }
    }
}

/// Build the handler state from the configured pool and upload directory.
///
/// # Errors
///
/// Returns an I/O error when the upload directory cannot be created.
pub(crate) fn build_http_state(config: &ServerConfig) -> io::Result<HttpState> {
    let repos = Repositories::new(&config.db_pool);
    let blobs = Arc::new(CapStdBlobStore::open(&config.upload_dir)?);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let accounts = Arc::new(AccountsService::new(
        Arc::clone(&repos.users),
        Arc::new(Argon2Hasher::new()),
        Arc::clone(&repos.uploads),
    ));
    let catalog = Arc::new(CatalogService::new(
        Arc::clone(&repos.users),
        Arc::clone(&repos.projects),
        Arc::clone(&repos.favorites),
        Arc::clone(&repos.uploads),
        Arc::clone(&blobs),
        Arc::clone(&clock),
    ));
    let favorites = Arc::new(FavoritesService::new(
        Arc::clone(&repos.projects),
        Arc::clone(&repos.favorites),
        Arc::clone(&clock),
    ));

    Ok(HttpState {
        login: accounts.clone(),
        accounts: accounts.clone(),
        profile: accounts,
        projects: catalog.clone(),
        projects_query: catalog.clone(),
        admin: catalog,
        favorites: favorites.clone(),
        favorites_query: favorites,
        author_sync: Arc::new(AuthorSyncService::new(repos.users, repos.projects)),
        uploads: Arc::new(UploadsService::new(repos.uploads, blobs, clock)),
    })
}
