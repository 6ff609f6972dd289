//! Driving port for favorite toggling.

use async_trait::async_trait;

use crate::domain::{Error, FavoriteState, ProjectId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoritesCommand: Send + Sync {
    /// Flip the actor's favorite on a project.
    ///
    /// Fails with `NotFound` when the project does not exist.
    async fn toggle_favorite(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
    ) -> Result<FavoriteState, Error>;
}
