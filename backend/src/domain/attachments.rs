//! Claiming and releasing uploaded files on behalf of projects and profiles.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::warn;

use crate::domain::ports::UploadLedger;
use crate::domain::service_support::map_upload_error;
use crate::domain::{Error, FileRef, UserId};

/// Minutes an upload may stay unclaimed before it is swept.
pub const UNCLAIMED_UPLOAD_TTL_MINUTES: i64 = 60;

/// Uploads made before the returned instant are eligible for sweeping.
pub fn unclaimed_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(UNCLAIMED_UPLOAD_TTL_MINUTES)
}

/// Claim `file_ref` for `owner`, or fail with an `InvalidRequest` naming
/// `field` when the upload is unknown, expired, taken, or someone else's.
pub(crate) async fn claim_upload<L>(
    ledger: &L,
    file_ref: &FileRef,
    uploaded_by: Option<UserId>,
    owner: &UserId,
    field: &str,
) -> Result<(), Error>
where
    L: UploadLedger + ?Sized,
{
    let claimed = ledger
        .claim(file_ref, uploaded_by, owner)
        .await
        .map_err(map_upload_error)?;
    if claimed {
        Ok(())
    } else {
        Err(
            Error::invalid_request(format!("file {file_ref} is not available"))
                .with_details(json!({ "field": field, "code": "unavailable" })),
        )
    }
}

/// Best-effort release; failures are logged.
pub(crate) async fn release_upload<L>(ledger: &L, file_ref: &FileRef)
where
    L: UploadLedger + ?Sized,
{
    if let Err(err) = ledger.release(file_ref).await {
        warn!(file_ref = %file_ref, error = %err, "failed to release upload");
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockUploadLedger, UploadLedgerError};

    fn file_ref() -> FileRef {
        FileRef::new("0123_thesis.pdf").expect("ref")
    }

    #[rstest]
    fn cutoff_is_one_ttl_before_now() {
        let now = Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .expect("timestamp");
        let cutoff = unclaimed_cutoff(now);
        assert_eq!(now - cutoff, Duration::minutes(UNCLAIMED_UPLOAD_TTL_MINUTES));
    }

    #[tokio::test]
    async fn refused_claims_name_the_field() {
        let mut ledger = MockUploadLedger::new();
        ledger.expect_claim().return_once(|_, _, _| Ok(false));

        let err = claim_upload(&ledger, &file_ref(), None, &UserId::random(), "avatarRef")
            .await
            .expect_err("refused");

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "avatarRef");
        assert_eq!(details["code"], "unavailable");
    }

    #[tokio::test]
    async fn ledger_outages_are_unavailable() {
        let mut ledger = MockUploadLedger::new();
        ledger
            .expect_claim()
            .return_once(|_, _, _| Err(UploadLedgerError::connection("down")));

        let err = claim_upload(&ledger, &file_ref(), None, &UserId::random(), "fileRef")
            .await
            .expect_err("outage");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
