//! PostgreSQL-backed `UserRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{AuthorIdentity, DisplayName, Email, FileRef, User, UserAccount, UserId};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserProfileUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Unique violations on writes can only come from the email constraint.
fn write_error(error: diesel::result::Error, email: &str) -> UserPersistenceError {
    if is_unique_violation(&error) {
        UserPersistenceError::duplicate_email(email)
    } else {
        diesel_error(error)
    }
}

fn row_to_user(row: &UserRow) -> Result<User, UserPersistenceError> {
    let invalid = |what: &str, err: String| {
        UserPersistenceError::query(format!("invalid stored {what} for user {}: {err}", row.id))
    };
    let display_name =
        DisplayName::new(row.display_name.clone()).map_err(|e| invalid("display name", e.to_string()))?;
    let email = Email::new(row.email.clone()).map_err(|e| invalid("email", e.to_string()))?;
    let avatar_ref = row
        .avatar_ref
        .clone()
        .map(FileRef::new)
        .transpose()
        .map_err(|e| invalid("avatar", e.to_string()))?;
    Ok(User::new(
        UserId::from(row.id),
        display_name,
        email,
        avatar_ref,
        row.is_admin,
    ))
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let user = row_to_user(&row)?;
    Ok(UserAccount {
        user,
        credential_hash: row.credential_hash,
    })
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserPersistenceError> {
    rows.iter().map(row_to_user).collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let user = &account.user;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            display_name: user.display_name().as_ref(),
            email: user.email().as_ref(),
            credential_hash: &account.credential_hash,
            avatar_ref: user.avatar_ref().map(FileRef::as_str),
            is_admin: user.is_admin(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| write_error(err, row.email))
    }

    async fn update_profile(
        &self,
        user: &User,
        credential_hash: Option<String>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = UserProfileUpdate {
            display_name: user.display_name().as_ref(),
            email: user.email().as_ref(),
            avatar_ref: user.avatar_ref().map(FileRef::as_str),
            is_admin: user.is_admin(),
        };
        let rehash = credential_hash
            .as_deref()
            .map(|hash| users::credential_hash.eq(hash));
        diesel::update(users::table.find(user.id().as_uuid()))
            .set((&changes, rehash))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| write_error(err, changes.email))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_account).transpose()
    }

    async fn list_identities(&self) -> Result<Vec<AuthorIdentity>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<(Uuid, String)> = users::table
            .select((users::id, users::display_name))
            .order_by((users::display_name, users::id))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter()
            .map(|(id, name)| {
                DisplayName::new(name)
                    .map(|name| AuthorIdentity::new(UserId::from(id), name))
                    .map_err(|e| {
                        UserPersistenceError::query(format!(
                            "invalid stored display name for user {id}: {e}"
                        ))
                    })
            })
            .collect()
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(&uuids))
            .select(UserRow::as_select())
            .order_by((users::display_name, users::id))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_users(rows)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by((users::display_name, users::id))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_users(rows)
    }
}
