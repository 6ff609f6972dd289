//! Driven port for identity persistence.
//!
//! Adapters store [`UserAccount`] records and expose the ordered identity
//! snapshot used by author reconciliation.

use async_trait::async_trait;

use crate::domain::{AuthorIdentity, User, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Identity store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Fails with `DuplicateEmail` on a taken address.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Persist profile fields (name, email, avatar, admin flag) of an
    /// existing user, and the credential hash when one is given, in a single
    /// write.
    async fn update_profile(
        &self,
        user: &User,
        credential_hash: Option<String>,
    ) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account, including its credential hash, by exact email.
    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Identity snapshot ordered by `display_name`, then `id`.
    async fn list_identities(&self) -> Result<Vec<AuthorIdentity>, UserPersistenceError>;

    /// Look up several users at once, ordered by `display_name`.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    /// Every user, ordered by `display_name`.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;
}
