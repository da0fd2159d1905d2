use std::path::PathBuf;
use thiserror::Error;

use crate::storage::StoreError;

/// Failures that abort a sync run
#[derive(Debug, Error)]
pub enum SyncError {
    /// The walker produced a path that is not strictly below the sync root
    #[error("{} is not below sync root {}", .path.display(), .root.display())]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    #[error("{} cannot be expressed as an object key (not valid UTF-8)", .0.display())]
    NonUnicodePath(PathBuf),

    #[error("failed to list s3://{bucket}/{prefix}")]
    Listing {
        bucket: String,
        prefix: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to read {}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to upload {} to s3://{bucket}/{key}", .path.display())]
    Upload {
        path: PathBuf,
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },
}
