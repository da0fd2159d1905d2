use anyhow::Result;
use std::num::NonZeroUsize;
use std::path::Path;
use tokio::task;
use tracing::info;

use crate::cli::SyncConfig;
use crate::diff::plan_uploads;
use crate::local::walk_files;
use crate::remote::list_all_objects;
use crate::storage::{ObjectStore, S3Store};
use crate::upload::upload_all;

/// What a finished sync did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub remote_objects: usize,
    pub uploaded_files: usize,
    pub uploaded_bytes: u64,
}

/// Main function to run the sync operation
pub async fn run_sync(config: SyncConfig) -> Result<SyncReport> {
    let store = S3Store::connect(&config).await;

    sync_directory(
        &store,
        &config.local_root,
        &config.bucket,
        &config.prefix,
        config.max_concurrent_uploads,
    )
    .await
}

/// Upload every file under `local_root` that is missing, resized or newer
/// than its counterpart under `s3://bucket/prefix`
pub async fn sync_directory<S: ObjectStore + ?Sized>(
    store: &S,
    local_root: &Path,
    bucket: &str,
    prefix: &str,
    max_concurrent_uploads: NonZeroUsize,
) -> Result<SyncReport> {
    // The whole remote inventory is needed before any local file can be judged
    let remote = list_all_objects(store, bucket, prefix).await?;
    let remote_objects = remote.len();
    info!(
        "Found {} existing objects under s3://{}/{}",
        remote_objects, bucket, prefix
    );

    let root = local_root.to_path_buf();
    let key_prefix = prefix.to_string();
    let tasks = task::spawn_blocking(move || {
        plan_uploads(&remote, walk_files(&root), &root, &key_prefix)
    })
    .await??;

    if tasks.is_empty() {
        info!("Everything is up to date.");
        return Ok(SyncReport {
            remote_objects,
            uploaded_files: 0,
            uploaded_bytes: 0,
        });
    }

    info!("Uploading {} files", tasks.len());
    let progress = upload_all(store, bucket, tasks, max_concurrent_uploads).await?;

    Ok(SyncReport {
        remote_objects,
        uploaded_files: progress.processed_files(),
        uploaded_bytes: progress.processed_bytes(),
    })
}
