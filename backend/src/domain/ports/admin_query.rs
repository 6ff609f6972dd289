//! Driving port for the administrator overview.

use async_trait::async_trait;

use crate::domain::{Error, Project, User, UserId};

/// Everything an administrator sees on the overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminOverview {
    /// All projects, newest first.
    pub projects: Vec<Project>,
    /// All users, ordered by display name.
    pub users: Vec<User>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminQuery: Send + Sync {
    /// Build the overview. Non-administrators get `Forbidden`.
    async fn admin_overview(&self, actor: &UserId) -> Result<AdminOverview, Error>;
}
