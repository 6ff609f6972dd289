//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed catalog entities, the pure rules that
//! govern them (author reconciliation, access control, favorite toggling),
//! and the services that implement the driving ports over the driven ports in
//! [`ports`].
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic error payload.
//! - [`User`], [`Project`], [`FileRef`]: validated entities.
//! - [`authors::reconcile_authors`], [`access::can_mutate`]: core rules.
//! - `*Service` types: domain services wired by the server.

pub mod access;
mod accounts_service;
pub mod attachments;
mod auth;
mod author_sync;
pub mod authors;
mod catalog_service;
pub mod error;
mod favorites;
mod favorites_service;
mod file_ref;
pub mod ports;
mod project;
mod service_support;
pub mod trace_id;
mod uploads_service;
mod user;

pub use self::accounts_service::{AccountsService, AdminBootstrap};
pub use self::auth::{
    AccountValidationError, LoginCredentials, PASSWORD_MIN, ProfileInput, ProfileUpdate,
    RegistrationInput, RegistrationRequest,
};
pub use self::author_sync::{AuthorSyncReport, AuthorSyncService};
pub use self::authors::{AuthorIdentity, AuthorReconciliation, ReconcileMode};
pub use self::catalog_service::CatalogService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::favorites::{Favorite, FavoriteState};
pub use self::favorites_service::FavoritesService;
pub use self::file_ref::{
    ALLOWED_EXTENSIONS, FileRef, FileRefError, MAX_UPLOAD_BYTES, ensure_allowed_extension,
    sanitise_file_name,
};
pub use self::project::{
    AUTHORS_TEXT_MAX, INITIAL_REVISION, Project, ProjectDraft, ProjectId,
    ProjectValidationError, TITLE_MAX,
};
pub use self::trace_id::TraceId;
pub use self::uploads_service::UploadsService;
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EMAIL_MAX, Email, User, UserAccount, UserId,
    UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use catalog::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
