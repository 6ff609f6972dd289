//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::json;

use crate::domain::{
    AccountsService, AuthorSyncService, CatalogService, DisplayName, Email, FavoritesService,
    UploadsService, User, UserId,
};
use crate::inbound::http::error::{json_config, path_config, query_config};
use crate::inbound::http::routes;
use crate::inbound::http::state::HttpState;
use crate::test_support::{FixtureClock, InMemoryBlobStore, InMemoryStore, PlainTextHasher};

/// Password given to every seeded account.
pub const PASSWORD: &str = "secret-pass";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by a response.
pub fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|c| c.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

/// In-memory adapters wired through the real domain services.
pub struct World {
    pub store: Arc<InMemoryStore>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub clock: Arc<FixtureClock>,
}

impl World {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::shared(),
            blobs: Arc::new(InMemoryBlobStore::default()),
            clock: Arc::new(FixtureClock::new()),
        }
    }

    /// Seed an account that can log in with [`PASSWORD`].
    pub fn seed_user(&self, name: &str, email: &str, is_admin: bool) -> User {
        let user = User::new(
            UserId::random(),
            DisplayName::new(name).expect("display name"),
            Email::new(email).expect("email"),
            None,
            is_admin,
        );
        self.store
            .seed_user(user.clone(), &format!("plain:{PASSWORD}"));
        user
    }

    pub fn state(&self) -> HttpState {
        let accounts = Arc::new(AccountsService::new(
            Arc::clone(&self.store),
            Arc::new(PlainTextHasher),
            Arc::clone(&self.store),
        ));
        let catalog = Arc::new(CatalogService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.store),
            Arc::clone(&self.store),
            Arc::clone(&self.store),
            Arc::clone(&self.blobs),
            self.clock.clone(),
        ));
        let favorites = Arc::new(FavoritesService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.store),
            self.clock.clone(),
        ));
        HttpState {
            login: accounts.clone(),
            accounts: accounts.clone(),
            profile: accounts,
            projects: catalog.clone(),
            projects_query: catalog.clone(),
            admin: catalog,
            favorites: favorites.clone(),
            favorites_query: favorites,
            author_sync: Arc::new(AuthorSyncService::new(
                Arc::clone(&self.store),
                Arc::clone(&self.store),
            )),
            uploads: Arc::new(UploadsService::new(
                Arc::clone(&self.store),
                Arc::clone(&self.blobs),
                self.clock.clone(),
            )),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Full `/api/v1` application over the given state.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(routes::configure))
}

/// Log in through the API and return the session cookie.
pub async fn login(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> Cookie<'static> {
    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    session_cookie(&res)
}
