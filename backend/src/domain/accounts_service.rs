//! Account domain service.
//!
//! Implements registration, login, profile reads and edits, and the
//! administrator bootstrap used by the `create-admin` binary.
//!
//! Avatars are claimed from the upload ledger: registration takes an
//! anonymous upload, a profile edit takes one made by the same user. A
//! replaced avatar is released back to the ledger, and the next upload sweep
//! deletes it once its time-to-live has passed.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::attachments::{claim_upload, release_upload};
use crate::domain::ports::{
    AccountsCommand, CredentialHasher, LoginService, UploadLedger, UserProfileQuery,
    UserRepository,
};
use crate::domain::service_support::{map_hash_error, map_user_error, require_actor};
use crate::domain::{
    Error, LoginCredentials, ProfileUpdate, RegistrationRequest, User, UserAccount, UserId,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";
const AVATAR_FIELD: &str = "avatarRef";

/// Result of [`AccountsService::create_admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    pub user: User,
    /// `false` when an existing account was promoted instead.
    pub created: bool,
}

/// Account service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountsService<U, H, L> {
    users: Arc<U>,
    hasher: Arc<H>,
    uploads: Arc<L>,
}

impl<U, H, L> AccountsService<U, H, L> {
    /// Create a new service over a user repository, credential hasher, and
    /// upload ledger.
    pub fn new(users: Arc<U>, hasher: Arc<H>, uploads: Arc<L>) -> Self {
        Self {
            users,
            hasher,
            uploads,
        }
    }
}

impl<U, H, L> AccountsService<U, H, L>
where
    U: UserRepository,
    H: CredentialHasher,
    L: UploadLedger,
{
    async fn ensure_email_free(&self, email: &str, owner: Option<&UserId>) -> Result<(), Error> {
        let existing = self
            .users
            .find_account_by_email(email)
            .await
            .map_err(map_user_error)?;
        match existing {
            Some(account) if Some(account.user.id()) != owner => {
                Err(Error::conflict("email already registered"))
            }
            _ => Ok(()),
        }
    }

    /// Create an administrator, or promote the account already using the
    /// email. The password is only set when a new account is created.
    pub async fn create_admin(&self, request: RegistrationRequest) -> Result<AdminBootstrap, Error> {
        let existing = self
            .users
            .find_account_by_email(request.email().as_ref())
            .await
            .map_err(map_user_error)?;

        if let Some(UserAccount { mut user, .. }) = existing {
            if !user.is_admin() {
                user.promote_to_admin();
                self.users
                    .update_profile(&user, None)
                    .await
                    .map_err(map_user_error)?;
            }
            info!(user_id = %user.id(), "promoted existing account to administrator");
            return Ok(AdminBootstrap {
                user,
                created: false,
            });
        }

        let user = self.store_new(request, true).await?;
        info!(user_id = %user.id(), "created administrator account");
        Ok(AdminBootstrap {
            user,
            created: true,
        })
    }

    async fn store_new(&self, request: RegistrationRequest, is_admin: bool) -> Result<User, Error> {
        let credential_hash = self
            .hasher
            .hash(request.password())
            .map_err(map_hash_error)?;
        let id = UserId::random();
        let avatar_ref = request.avatar_ref().cloned();
        if let Some(avatar) = avatar_ref.as_ref() {
            claim_upload(self.uploads.as_ref(), avatar, None, &id, AVATAR_FIELD).await?;
        }
        let user = User::new(
            id,
            request.display_name().clone(),
            request.email().clone(),
            avatar_ref,
            is_admin,
        );
        let account = UserAccount {
            user,
            credential_hash,
        };
        if let Err(err) = self.users.insert(&account).await {
            if let Some(avatar) = account.user.avatar_ref() {
                release_upload(self.uploads.as_ref(), avatar).await;
            }
            return Err(map_user_error(err));
        }
        Ok(account.user)
    }
}

#[async_trait]
impl<U, H, L> AccountsCommand for AccountsService<U, H, L>
where
    U: UserRepository,
    H: CredentialHasher,
    L: UploadLedger,
{
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error> {
        self.ensure_email_free(request.email().as_ref(), None)
            .await?;
        let user = self.store_new(request, false).await?;
        info!(user_id = %user.id(), "registered account");
        Ok(user)
    }

    async fn update_profile(&self, actor: &UserId, update: ProfileUpdate) -> Result<User, Error> {
        let mut user = require_actor(self.users.as_ref(), actor).await?;
        if update.is_empty() {
            return Ok(user);
        }

        let ProfileUpdate {
            display_name,
            email,
            password,
            avatar_ref,
        } = update;

        if let Some(email) = email {
            if email != *user.email() {
                self.ensure_email_free(email.as_ref(), Some(actor)).await?;
            }
            user.set_email(email);
        }
        if let Some(display_name) = display_name {
            user.set_display_name(display_name);
        }
        let credential_hash = password
            .map(|password| self.hasher.hash(&password))
            .transpose()
            .map_err(map_hash_error)?;

        let previous_avatar = user.avatar_ref().cloned();
        let new_avatar = avatar_ref.filter(|avatar| previous_avatar.as_ref() != Some(avatar));
        if let Some(avatar) = new_avatar.as_ref() {
            claim_upload(self.uploads.as_ref(), avatar, Some(*actor), actor, AVATAR_FIELD)
                .await?;
            user.set_avatar_ref(Some(avatar.clone()));
        }

        if let Err(err) = self.users.update_profile(&user, credential_hash).await {
            if let Some(avatar) = new_avatar.as_ref() {
                release_upload(self.uploads.as_ref(), avatar).await;
            }
            return Err(map_user_error(err));
        }

        if let Some(old) = previous_avatar.filter(|_| new_avatar.is_some()) {
            release_upload(self.uploads.as_ref(), &old).await;
        }
        Ok(user)
    }
}

#[async_trait]
impl<U, H, L> LoginService for AccountsService<U, H, L>
where
    U: UserRepository,
    H: CredentialHasher,
    L: UploadLedger,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let account = self
            .users
            .find_account_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;

        let verified = self
            .hasher
            .verify(credentials.password(), &account.credential_hash)
            .map_err(map_hash_error)?;
        if verified {
            Ok(account.user)
        } else {
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }
}

#[async_trait]
impl<U, H, L> UserProfileQuery for AccountsService<U, H, L>
where
    U: UserRepository,
    H: CredentialHasher,
    L: UploadLedger,
{
    async fn current_user(&self, user_id: &UserId) -> Result<User, Error> {
        require_actor(self.users.as_ref(), user_id).await
    }
}

#[cfg(test)]
#[path = "accounts_service_tests.rs"]
mod tests;
