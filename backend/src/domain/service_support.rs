//! Internal helpers shared by the domain services.

use crate::domain::ports::{
    BlobStoreError, CredentialHashError, FavoritePersistenceError, ProjectPersistenceError,
    UploadLedgerError, UserPersistenceError, UserRepository,
};
use crate::domain::{Error, User, UserId};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("email already registered")
        }
    }
}

pub(crate) fn map_project_error(error: ProjectPersistenceError) -> Error {
    match error {
        ProjectPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("project repository unavailable: {message}"))
        }
        ProjectPersistenceError::Query { message } => {
            Error::internal(format!("project repository error: {message}"))
        }
        ProjectPersistenceError::NotFound { id } => {
            Error::not_found(format!("project {id} not found"))
        }
        ProjectPersistenceError::RevisionMismatch { expected, actual } => Error::conflict(
            format!("project was modified concurrently: expected revision {expected}, found {actual}"),
        ),
    }
}

pub(crate) fn map_favorite_error(error: FavoritePersistenceError) -> Error {
    match error {
        FavoritePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("favorite repository unavailable: {message}"))
        }
        FavoritePersistenceError::Query { message } => {
            Error::internal(format!("favorite repository error: {message}"))
        }
    }
}

pub(crate) fn map_blob_error(error: BlobStoreError) -> Error {
    match error {
        BlobStoreError::InvalidName { message } => Error::invalid_request(message),
        BlobStoreError::Io { message } => Error::internal(format!("blob store error: {message}")),
    }
}

pub(crate) fn map_upload_error(error: UploadLedgerError) -> Error {
    match error {
        UploadLedgerError::Connection { message } => {
            Error::service_unavailable(format!("upload ledger unavailable: {message}"))
        }
        UploadLedgerError::Query { message } => {
            Error::internal(format!("upload ledger error: {message}"))
        }
    }
}

pub(crate) fn map_hash_error(error: CredentialHashError) -> Error {
    Error::internal(error.to_string())
}

/// Load the acting identity, treating a vanished user as unauthenticated.
pub(crate) async fn require_actor<U>(users: &U, actor: &UserId) -> Result<User, Error>
where
    U: UserRepository + ?Sized,
{
    users
        .find_by_id(actor)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| Error::unauthorized("login required"))
}
