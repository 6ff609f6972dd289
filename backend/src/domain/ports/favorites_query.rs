//! Driving port for listing favorites.

use async_trait::async_trait;

use crate::domain::{Error, Project, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoritesQuery: Send + Sync {
    /// The actor's favorited projects, newest favorite first.
    async fn list_favorites(&self, actor: &UserId) -> Result<Vec<Project>, Error>;
}
