//! Driving port for account registration and profile edits.

use async_trait::async_trait;

use crate::domain::{Error, ProfileUpdate, RegistrationRequest, User, UserId};

/// Account mutations exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsCommand: Send + Sync {
    /// Create a non-admin account. A taken email is a `Conflict`.
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error>;

    /// Apply a partial profile update for `actor`.
    async fn update_profile(&self, actor: &UserId, update: ProfileUpdate) -> Result<User, Error>;
}
