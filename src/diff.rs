use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SyncError;
use crate::local::{remote_key, LocalFile};
use crate::storage::RemoteObject;

/// A local file that has to be uploaded to `remote_key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub remote_key: String,
    pub local_path: PathBuf,
    /// Size when the file was compared
    pub size: u64,
}

/// Whether `local` has to be (re)uploaded given what the store holds at its key.
///
/// A remote copy newer than the local file counts as up to date.
pub fn needs_upload(local: &LocalFile, remote: Option<&RemoteObject>) -> bool {
    match remote {
        None => true,
        Some(remote) => {
            remote.size != local.size || remote.last_modified < local.last_modified
        }
    }
}

/// Join the local files against the remote inventory and collect the uploads
/// needed, in the order the local files were produced
pub fn plan_uploads<I>(
    remote: &[RemoteObject],
    local_files: I,
    root: &Path,
    prefix: &str,
) -> Result<Vec<UploadTask>, SyncError>
where
    I: IntoIterator<Item = Result<PathBuf, SyncError>>,
{
    let by_key: HashMap<&str, &RemoteObject> =
        remote.iter().map(|object| (object.key.as_str(), object)).collect();

    let mut tasks = Vec::new();

    for path in local_files {
        let path = path?;
        let key = remote_key(&path, root, prefix)?;
        let local = LocalFile::stat(&path)?;

        if needs_upload(&local, by_key.get(key.as_str()).copied()) {
            tasks.push(UploadTask {
                remote_key: key,
                local_path: local.path,
                size: local.size,
            });
        } else {
            debug!("{} is up to date", key);
        }
    }

    Ok(tasks)
}
