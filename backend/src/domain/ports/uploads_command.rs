//! Driving port for file uploads and downloads.

use async_trait::async_trait;

use crate::domain::{Error, FileRef, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadsCommand: Send + Sync {
    /// Store an uploaded file and return its reference.
    ///
    /// `uploader` is `None` for anonymous uploads, which only registration
    /// can claim. Rejects disallowed file types and bodies over the size
    /// limit with `InvalidRequest`.
    async fn upload(
        &self,
        uploader: Option<UserId>,
        original_name: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRef, Error>;

    /// Read a stored file. Missing files are `NotFound`.
    async fn download(&self, file_ref: &FileRef) -> Result<Vec<u8>, Error>;
}
