//! Upload and download service over the blob store.
//!
//! Every stored blob is recorded in the upload ledger with its uploader.
//! Each upload first sweeps entries that stayed unclaimed past
//! [`UNCLAIMED_UPLOAD_TTL_MINUTES`](crate::domain::attachments::UNCLAIMED_UPLOAD_TTL_MINUTES),
//! so abandoned files and released avatars do not accumulate.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::attachments::unclaimed_cutoff;
use crate::domain::ports::{BlobStore, BlobStoreError, UploadLedger, UploadRecord, UploadsCommand};
use crate::domain::service_support::{map_blob_error, map_upload_error};
use crate::domain::{Error, FileRef, MAX_UPLOAD_BYTES, UserId};

/// Service implementing [`UploadsCommand`].
#[derive(Clone)]
pub struct UploadsService<L, B> {
    uploads: Arc<L>,
    blobs: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<L, B> UploadsService<L, B> {
    pub fn new(uploads: Arc<L>, blobs: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            uploads,
            blobs,
            clock,
        }
    }
}

fn file_error(code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": "file", "code": code }))
}

impl<L, B> UploadsService<L, B>
where
    L: UploadLedger,
    B: BlobStore,
{
    /// Delete blobs whose uploads expired unclaimed. Returns how many went.
    ///
    /// Failures are logged; the sweep never blocks a new upload.
    pub async fn sweep_expired(&self) -> usize {
        let cutoff = unclaimed_cutoff(self.clock.utc());
        let expired = match self.uploads.expired(cutoff).await {
            Ok(expired) => expired,
            Err(err) => {
                warn!(error = %err, "failed to list expired uploads");
                return 0;
            }
        };

        let mut removed = 0;
        for file_ref in expired {
            match self.uploads.forget_unclaimed(&file_ref).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    warn!(file_ref = %file_ref, error = %err, "failed to expire upload");
                    continue;
                }
            }
            if let Err(err) = self.blobs.remove(&file_ref).await {
                warn!(file_ref = %file_ref, error = %err, "failed to remove expired upload");
                continue;
            }
            removed += 1;
        }
        if removed > 0 {
            debug!(removed, "swept expired uploads");
        }
        removed
    }
}

#[async_trait]
impl<L, B> UploadsCommand for UploadsService<L, B>
where
    L: UploadLedger,
    B: BlobStore,
{
    async fn upload(
        &self,
        uploader: Option<UserId>,
        original_name: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRef, Error> {
        if bytes.is_empty() {
            return Err(file_error("empty", "uploaded file is empty"));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(file_error(
                "too_large",
                format!("uploaded file exceeds {MAX_UPLOAD_BYTES} bytes"),
            ));
        }
        self.sweep_expired().await;

        let file_ref = self
            .blobs
            .put(original_name, &bytes)
            .await
            .map_err(|err| match err {
                BlobStoreError::InvalidName { message } => file_error("invalid", message),
                other => map_blob_error(other),
            })?;
        let record = UploadRecord {
            file_ref: file_ref.clone(),
            uploaded_by: uploader,
            uploaded_at: self.clock.utc(),
        };
        if let Err(err) = self.uploads.record(&record).await {
            if let Err(remove_err) = self.blobs.remove(&file_ref).await {
                warn!(file_ref = %file_ref, error = %remove_err, "failed to remove unrecorded upload");
            }
            return Err(map_upload_error(err));
        }
        Ok(file_ref)
    }

    async fn download(&self, file_ref: &FileRef) -> Result<Vec<u8>, Error> {
        self.blobs
            .get(file_ref)
            .await
            .map_err(map_blob_error)?
            .ok_or_else(|| Error::not_found(format!("file {file_ref} not found")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::attachments::UNCLAIMED_UPLOAD_TTL_MINUTES;
    use crate::domain::ports::{MockUploadLedger, UploadLedgerError};
    use crate::test_support::{FixtureClock, InMemoryBlobStore, InMemoryStore};

    struct Fixture {
        store: Arc<InMemoryStore>,
        blobs: Arc<InMemoryBlobStore>,
        clock: Arc<FixtureClock>,
        service: UploadsService<InMemoryStore, InMemoryBlobStore>,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::shared();
        let blobs = Arc::new(InMemoryBlobStore::default());
        let clock = Arc::new(FixtureClock::new());
        let service = UploadsService::new(store.clone(), blobs.clone(), clock.clone());
        Fixture {
            store,
            blobs,
            clock,
            service,
        }
    }

    fn past_ttl() -> Duration {
        Duration::minutes(UNCLAIMED_UPLOAD_TTL_MINUTES + 1)
    }

    #[tokio::test]
    async fn upload_then_download_returns_bytes() {
        let fx = fixture();
        let file_ref = fx
            .service
            .upload(None, "thesis.pdf", b"%PDF".to_vec())
            .await
            .expect("upload");
        assert!(file_ref.as_str().ends_with("_thesis.pdf"));
        let bytes = fx.service.download(&file_ref).await.expect("download");
        assert_eq!(bytes, b"%PDF");
    }

    #[tokio::test]
    async fn uploads_are_recorded_with_their_uploader() {
        let fx = fixture();
        let ana = UserId::random();
        let file_ref = fx
            .service
            .upload(Some(ana), "thesis.pdf", b"%PDF".to_vec())
            .await
            .expect("upload");

        assert_eq!(fx.store.upload_state(&file_ref), Some((Some(ana), false)));
    }

    #[rstest]
    #[case("virus.exe", vec![1], "invalid")]
    #[case("thesis.pdf", vec![], "empty")]
    #[case("thesis.pdf", vec![0; MAX_UPLOAD_BYTES + 1], "too_large")]
    #[tokio::test]
    async fn upload_rejects_bad_files(
        #[case] name: &str,
        #[case] bytes: Vec<u8>,
        #[case] code: &str,
    ) {
        let err = fixture()
            .service
            .upload(None, name, bytes)
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "file");
        assert_eq!(details["code"], code);
    }

    #[tokio::test]
    async fn download_of_unknown_reference_is_not_found() {
        let missing = FileRef::new("nope.pdf").expect("ref");
        let err = fixture()
            .service
            .download(&missing)
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn abandoned_uploads_are_swept_after_their_ttl() {
        let fx = fixture();
        let abandoned = fx
            .service
            .upload(None, "old.png", vec![1])
            .await
            .expect("upload");
        let owner = UserId::random();
        let kept = fx
            .service
            .upload(Some(owner), "kept.pdf", vec![2])
            .await
            .expect("upload");
        fx.store.seed_claim(&kept, owner);

        fx.clock.advance(past_ttl());
        let fresh = fx
            .service
            .upload(None, "new.png", vec![3])
            .await
            .expect("upload");

        assert!(!fx.blobs.contains(&abandoned));
        assert_eq!(fx.store.upload_state(&abandoned), None);
        assert!(fx.blobs.contains(&kept));
        assert!(fx.blobs.contains(&fresh));
    }

    #[tokio::test]
    async fn uploads_within_the_ttl_survive_a_sweep() {
        let fx = fixture();
        let recent = fx
            .service
            .upload(None, "recent.png", vec![1])
            .await
            .expect("upload");
        fx.clock.advance(Duration::minutes(UNCLAIMED_UPLOAD_TTL_MINUTES - 1));

        assert_eq!(fx.service.sweep_expired().await, 0);
        assert!(fx.blobs.contains(&recent));
    }

    #[tokio::test]
    async fn unrecorded_uploads_are_removed_again() {
        let blobs = Arc::new(InMemoryBlobStore::default());
        let mut ledger = MockUploadLedger::new();
        ledger.expect_expired().returning(|_| Ok(Vec::new()));
        ledger
            .expect_record()
            .return_once(|_| Err(UploadLedgerError::connection("down")));
        let service = UploadsService::new(
            Arc::new(ledger),
            blobs.clone(),
            Arc::new(FixtureClock::new()),
        );

        let err = service
            .upload(None, "thesis.pdf", vec![1])
            .await
            .expect_err("ledger down");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(blobs.len(), 0);
    }
}
