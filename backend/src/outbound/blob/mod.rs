//! File storage adapters for uploads and avatars.

mod cap_std_blob_store;

pub use cap_std_blob_store::CapStdBlobStore;
