use tracing::debug;

use crate::error::SyncError;
use crate::storage::{ObjectStore, RemoteObject, StoreError};

/// List every object under `prefix`, following continuation tokens until the
/// store reports the listing is complete
pub async fn list_all_objects<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    prefix: &str,
) -> Result<Vec<RemoteObject>, SyncError> {
    let listing_error = |source: StoreError| SyncError::Listing {
        bucket: bucket.to_string(),
        prefix: prefix.to_string(),
        source,
    };

    let mut result = Vec::new();
    let mut continuation = None;
    let mut pages = 0usize;

    loop {
        let page = store
            .list_objects(bucket, prefix, continuation.take())
            .await
            .map_err(listing_error)?;
        pages += 1;

        debug!(
            "Listing page {} returned {} objects (truncated: {})",
            pages,
            page.objects.len(),
            page.is_truncated
        );
        result.extend(page.objects);

        if !page.is_truncated {
            break;
        }

        match page.next_continuation {
            Some(token) => continuation = Some(token),
            None => {
                return Err(listing_error(
                    "listing was truncated but no continuation token was returned".into(),
                ))
            }
        }
    }

    Ok(result)
}
