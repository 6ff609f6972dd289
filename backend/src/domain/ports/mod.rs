//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`BlobStore`], [`UploadLedger`],
//! [`CredentialHasher`]) are implemented by outbound adapters. Driving ports
//! (`*Command`, `*Query`, [`LoginService`]) are implemented by domain
//! services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod accounts_command;
mod admin_query;
mod author_sync_command;
mod blob_store;
mod credential_hasher;
mod favorite_repository;
mod favorites_command;
mod favorites_query;
mod login_service;
mod project_command;
mod project_query;
mod project_repository;
mod upload_ledger;
mod uploads_command;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use accounts_command::MockAccountsCommand;
pub use accounts_command::AccountsCommand;
#[cfg(test)]
pub use admin_query::MockAdminQuery;
pub use admin_query::{AdminOverview, AdminQuery};
#[cfg(test)]
pub use author_sync_command::MockAuthorSyncCommand;
pub use author_sync_command::AuthorSyncCommand;
#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher};
#[cfg(test)]
pub use favorite_repository::MockFavoriteRepository;
pub use favorite_repository::{FavoritePersistenceError, FavoriteRepository};
#[cfg(test)]
pub use favorites_command::MockFavoritesCommand;
pub use favorites_command::FavoritesCommand;
#[cfg(test)]
pub use favorites_query::MockFavoritesQuery;
pub use favorites_query::FavoritesQuery;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use project_command::MockProjectCommand;
pub use project_command::{ProjectCommand, ProjectMutation, UpdateProjectRequest};
#[cfg(test)]
pub use project_query::MockProjectQuery;
pub use project_query::{
    PROJECTS_PER_PAGE, ProjectDetail, ProjectPage, ProjectQuery, ProjectSearch,
};
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{
    ProjectPersistenceError, ProjectRepository, ProjectSearchQuery, ProjectSlice,
};
#[cfg(test)]
pub use upload_ledger::MockUploadLedger;
pub use upload_ledger::{UploadLedger, UploadLedgerError, UploadRecord};
#[cfg(test)]
pub use uploads_command::MockUploadsCommand;
pub use uploads_command::UploadsCommand;
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
