//! Filesystem blob store rooted in a capability directory.
//!
//! All access goes through a `cap_std::fs::Dir`, so a stored reference can
//! never escape the upload root even if validation upstream is bypassed.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::FileRef;
use crate::domain::ports::{BlobStore, BlobStoreError};

/// [`BlobStore`] adapter writing one file per reference under a root
/// directory.
#[derive(Clone)]
pub struct CapStdBlobStore {
    root: Arc<Dir>,
}

impl CapStdBlobStore {
    /// Open `path`, creating it and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be created
    /// or opened.
    pub fn open(path: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let root = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self::from_dir(root))
    }

    pub fn from_dir(root: Dir) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, BlobStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, BlobStoreError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|err| BlobStoreError::io(err.to_string()))?
    }
}

fn io_error(err: &io::Error) -> BlobStoreError {
    BlobStoreError::io(err.to_string())
}

#[async_trait]
impl BlobStore for CapStdBlobStore {
    async fn put(&self, original_name: &str, bytes: &[u8]) -> Result<FileRef, BlobStoreError> {
        let file_ref = FileRef::for_upload(original_name)
            .map_err(|err| BlobStoreError::invalid_name(err.to_string()))?;
        let name = file_ref.as_str().to_owned();
        let bytes = bytes.to_vec();
        let size = bytes.len();
        self.blocking(move |root| root.write(&name, &bytes).map_err(|err| io_error(&err)))
            .await?;
        debug!(file_ref = %file_ref, size, "stored upload");
        Ok(file_ref)
    }

    async fn get(&self, file_ref: &FileRef) -> Result<Option<Vec<u8>>, BlobStoreError> {
        let name = file_ref.as_str().to_owned();
        self.blocking(move |root| match root.read(&name) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(&err)),
        })
        .await
    }

    async fn remove(&self, file_ref: &FileRef) -> Result<(), BlobStoreError> {
        let name = file_ref.as_str().to_owned();
        self.blocking(move |root| match root.remove_file(&name) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&err)),
        })
        .await
    }
}
