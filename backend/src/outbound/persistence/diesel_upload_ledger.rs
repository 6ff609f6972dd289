//! PostgreSQL-backed `UploadLedger` implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UploadLedger, UploadLedgerError, UploadRecord};
use crate::domain::{FileRef, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewUploadRow;
use super::pool::{DbPool, PoolError};
use super::schema::uploads;

/// Diesel-backed implementation of the [`UploadLedger`] port.
#[derive(Clone)]
pub struct DieselUploadLedger {
    pool: DbPool,
}

impl DieselUploadLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UploadLedgerError {
    map_pool_error(error, UploadLedgerError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UploadLedgerError {
    map_diesel_error(
        error,
        UploadLedgerError::query,
        UploadLedgerError::connection,
    )
}

fn new_row(upload: &UploadRecord) -> NewUploadRow<'_> {
    NewUploadRow {
        file_ref: upload.file_ref.as_str(),
        uploaded_by: upload.uploaded_by.map(|id| *id.as_uuid()),
        uploaded_at: upload.uploaded_at,
        claimed: false,
    }
}

fn stored_ref(value: String) -> Result<FileRef, UploadLedgerError> {
    FileRef::new(value.clone())
        .map_err(|err| UploadLedgerError::query(format!("invalid stored upload {value}: {err}")))
}

#[async_trait]
impl UploadLedger for DieselUploadLedger {
    async fn record(&self, upload: &UploadRecord) -> Result<(), UploadLedgerError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(uploads::table)
            .values(&new_row(upload))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn claim(
        &self,
        file_ref: &FileRef,
        uploaded_by: Option<UserId>,
        owner: &UserId,
    ) -> Result<bool, UploadLedgerError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let unclaimed = uploads::table
            .find(file_ref.as_str())
            .filter(uploads::claimed.eq(false));
        let changes = (
            uploads::claimed.eq(true),
            uploads::uploaded_by.eq(Some(*owner.as_uuid())),
        );
        let updated = match uploaded_by {
            Some(uploader) => {
                diesel::update(unclaimed.filter(uploads::uploaded_by.eq(*uploader.as_uuid())))
                    .set(changes)
                    .execute(&mut conn)
                    .await
            }
            None => {
                diesel::update(unclaimed.filter(uploads::uploaded_by.is_null()))
                    .set(changes)
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(diesel_error)?;
        Ok(updated == 1)
    }

    async fn release(&self, file_ref: &FileRef) -> Result<(), UploadLedgerError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(uploads::table.find(file_ref.as_str()))
            .set(uploads::claimed.eq(false))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn forget(&self, file_ref: &FileRef) -> Result<(), UploadLedgerError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(uploads::table.find(file_ref.as_str()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn expired(
        &self,
        uploaded_before: DateTime<Utc>,
    ) -> Result<Vec<FileRef>, UploadLedgerError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let refs: Vec<String> = uploads::table
            .filter(uploads::claimed.eq(false))
            .filter(uploads::uploaded_at.lt(uploaded_before))
            .order_by((uploads::uploaded_at, uploads::file_ref))
            .select(uploads::file_ref)
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        refs.into_iter().map(stored_ref).collect()
    }

    async fn forget_unclaimed(&self, file_ref: &FileRef) -> Result<bool, UploadLedgerError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(
            uploads::table
                .find(file_ref.as_str())
                .filter(uploads::claimed.eq(false)),
        )
        .execute(&mut conn)
        .await
        .map(|removed| removed > 0)
        .map_err(diesel_error)
    }
}
