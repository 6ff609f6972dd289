//! Driven port recording who stored each blob and who holds it.
//!
//! A stored file starts unclaimed. A project or profile takes it with
//! [`UploadLedger::claim`], which succeeds at most once per reference, so no
//! two records ever point at the same blob. Unclaimed entries expire and are
//! swept together with their blobs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{FileRef, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by upload ledger adapters.
    pub enum UploadLedgerError {
        /// Repository connection could not be established.
        Connection { message: String } => "upload ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "upload ledger query failed: {message}",
    }
}

/// A freshly stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub file_ref: FileRef,
    /// `None` for anonymous uploads made before registering.
    pub uploaded_by: Option<UserId>,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadLedger: Send + Sync {
    /// Record a new, unclaimed upload.
    async fn record(&self, upload: &UploadRecord) -> Result<(), UploadLedgerError>;

    /// Hand an unclaimed upload made by `uploaded_by` to `owner`.
    ///
    /// Returns `false` when the reference is unknown, already claimed, or was
    /// uploaded by someone else. Check and update happen atomically.
    async fn claim(
        &self,
        file_ref: &FileRef,
        uploaded_by: Option<UserId>,
        owner: &UserId,
    ) -> Result<bool, UploadLedgerError>;

    /// Return a claimed upload to its owner's unclaimed pool, where it
    /// expires like any other unclaimed upload.
    async fn release(&self, file_ref: &FileRef) -> Result<(), UploadLedgerError>;

    /// Drop the entry whatever its state. Used once the blob is removed.
    async fn forget(&self, file_ref: &FileRef) -> Result<(), UploadLedgerError>;

    /// Unclaimed references uploaded before `uploaded_before`.
    async fn expired(
        &self,
        uploaded_before: DateTime<Utc>,
    ) -> Result<Vec<FileRef>, UploadLedgerError>;

    /// Drop the entry only if it is still unclaimed. Returns whether it was
    /// dropped.
    async fn forget_unclaimed(&self, file_ref: &FileRef) -> Result<bool, UploadLedgerError>;
}
