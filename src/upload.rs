use futures::stream::{self, StreamExt};
use std::num::NonZeroUsize;
use std::pin::pin;
use tracing::{error, info};

use crate::diff::UploadTask;
use crate::error::SyncError;
use crate::progress::ProgressTracker;
use crate::storage::{ObjectStore, StoreError};

/// Upload every task, at most `max_concurrent` at a time.
///
/// Stops at the first failed upload: no new uploads are started and the ones
/// still in flight are dropped. Completed uploads are left in place.
pub async fn upload_all<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    tasks: Vec<UploadTask>,
    max_concurrent: NonZeroUsize,
) -> Result<ProgressTracker, SyncError> {
    let total_size = tasks.iter().map(|task| task.size).sum();
    let mut progress = ProgressTracker::new(tasks.len(), total_size);

    let mut uploads = pin!(stream::iter(tasks)
        .map(|task| upload_one(store, bucket, task))
        .buffer_unordered(max_concurrent.get()));

    while let Some(result) = uploads.next().await {
        match result {
            Ok(task) => {
                progress.update(task.size);
                info!("{} uploaded. ({})", task.remote_key, progress.status());
            }
            Err(e) => {
                error!("Error during upload: {}", e);
                progress.finish();
                return Err(e);
            }
        }
    }

    progress.finish();
    Ok(progress)
}

async fn upload_one<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    task: UploadTask,
) -> Result<UploadTask, SyncError> {
    store
        .put_object(bucket, &task.remote_key, &task.local_path)
        .await
        .map_err(|source: StoreError| SyncError::Upload {
            path: task.local_path.clone(),
            bucket: bucket.to_string(),
            key: task.remote_key.clone(),
            source,
        })?;

    Ok(task)
}
