//! Driven port for favorite membership.

use async_trait::async_trait;

use crate::domain::{Favorite, ProjectId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by favorite repository adapters.
    pub enum FavoritePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "favorite repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "favorite repository query failed: {message}",
    }
}

/// Favorite store keyed by `(user_id, project_id)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Whether the pair is currently favorited.
    async fn exists(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
    ) -> Result<bool, FavoritePersistenceError>;

    /// Record a favorite. Inserting an existing pair is a no-op.
    async fn add(&self, favorite: &Favorite) -> Result<(), FavoritePersistenceError>;

    /// Remove a favorite, returning whether one existed.
    async fn remove(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
    ) -> Result<bool, FavoritePersistenceError>;

    /// The user's favorited project ids, newest favorite first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProjectId>, FavoritePersistenceError>;
}
