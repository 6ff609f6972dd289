//! Driving port for batch author reconciliation.

use async_trait::async_trait;

use crate::domain::{AuthorSyncReport, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorSyncCommand: Send + Sync {
    /// Run the batch pass on behalf of an administrator.
    async fn sync_authors(&self, actor: &UserId) -> Result<AuthorSyncReport, Error>;
}
