//! Driven port for attachment and avatar storage.

use async_trait::async_trait;

use crate::domain::FileRef;

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob store adapters.
    pub enum BlobStoreError {
        /// The supplied file name is unusable or its type is not allowed.
        InvalidName { message: String } => "invalid file name: {message}",
        /// Reading or writing the backing store failed.
        Io { message: String } => "blob store i/o failed: {message}",
    }
}

/// Opaque file storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under a fresh reference derived from `original_name`.
    async fn put(&self, original_name: &str, bytes: &[u8]) -> Result<FileRef, BlobStoreError>;

    /// Read a stored file; `None` when nothing is stored under the reference.
    async fn get(&self, file_ref: &FileRef) -> Result<Option<Vec<u8>>, BlobStoreError>;

    /// Remove a stored file. Removing a missing file succeeds.
    async fn remove(&self, file_ref: &FileRef) -> Result<(), BlobStoreError>;
}
