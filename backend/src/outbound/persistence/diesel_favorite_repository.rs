//! PostgreSQL-backed `FavoriteRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{FavoritePersistenceError, FavoriteRepository};
use crate::domain::{Favorite, ProjectId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewFavoriteRow;
use super::pool::{DbPool, PoolError};
use super::schema::favorites;

/// Diesel-backed implementation of the [`FavoriteRepository`] port.
#[derive(Clone)]
pub struct DieselFavoriteRepository {
    pool: DbPool,
}

impl DieselFavoriteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> FavoritePersistenceError {
    map_pool_error(error, FavoritePersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> FavoritePersistenceError {
    map_diesel_error(
        error,
        FavoritePersistenceError::query,
        FavoritePersistenceError::connection,
    )
}

fn new_row(favorite: &Favorite) -> NewFavoriteRow {
    NewFavoriteRow {
        user_id: *favorite.user_id.as_uuid(),
        project_id: *favorite.project_id.as_uuid(),
        created_at: favorite.created_at,
    }
}

#[async_trait]
impl FavoriteRepository for DieselFavoriteRepository {
    async fn exists(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
    ) -> Result<bool, FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::select(diesel::dsl::exists(
            favorites::table.find((user_id.as_uuid(), project_id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(diesel_error)
    }

    async fn add(&self, favorite: &Favorite) -> Result<(), FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(favorites::table)
            .values(&new_row(favorite))
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn remove(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
    ) -> Result<bool, FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(favorites::table.find((user_id.as_uuid(), project_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|removed| removed > 0)
            .map_err(diesel_error)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ProjectId>, FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let ids: Vec<Uuid> = favorites::table
            .filter(favorites::user_id.eq(user_id.as_uuid()))
            .order_by((favorites::created_at.desc(), favorites::project_id))
            .select(favorites::project_id)
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(ids.into_iter().map(ProjectId::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn rows_carry_both_keys_and_timestamp() {
        let favorite = Favorite {
            user_id: UserId::random(),
            project_id: ProjectId::random(),
            created_at: Utc::now(),
        };
        let row = new_row(&favorite);
        assert_eq!(&row.user_id, favorite.user_id.as_uuid());
        assert_eq!(&row.project_id, favorite.project_id.as_uuid());
        assert_eq!(row.created_at, favorite.created_at);
    }
}
