use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::error::SyncError;

/// Size and modification time of a local file, read when it is compared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    pub size: u64,
    pub last_modified: SystemTime,
}

impl LocalFile {
    pub fn stat(path: &Path) -> Result<Self, SyncError> {
        let walk_error = |source: std::io::Error| SyncError::Walk {
            path: path.to_path_buf(),
            source,
        };

        let metadata = std::fs::metadata(path).map_err(walk_error)?;
        let last_modified = metadata.modified().map_err(walk_error)?;

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            last_modified,
        })
    }
}

/// Lazily yield every regular file below `root`, at any depth.
///
/// Entries come out sorted by file name within each directory so the order is
/// the same on every platform. Symlinks are followed and yielded under their
/// link path. Any error while reading the tree, including a symlink loop, is
/// yielded and is expected to end the walk.
pub fn walk_files(root: &Path) -> impl Iterator<Item = Result<PathBuf, SyncError>> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
            Ok(_) => None,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                Some(Err(SyncError::Walk {
                    path,
                    source: e.into(),
                }))
            }
        })
}

/// Derive the object key for `path`: `prefix/relative/path` with `/` separators.
///
/// `path` must lie strictly below `root`; anything else means the walker and
/// this function disagree about the root and is reported as an error.
pub fn remote_key(path: &Path, root: &Path, prefix: &str) -> Result<String, SyncError> {
    let outside_root = || SyncError::PathOutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    };

    let relative = path.strip_prefix(root).map_err(|_| outside_root())?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(
                segment
                    .to_str()
                    .ok_or_else(|| SyncError::NonUnicodePath(path.to_path_buf()))?,
            ),
            Component::CurDir => {}
            _ => return Err(outside_root()),
        }
    }

    if segments.is_empty() {
        return Err(outside_root());
    }

    Ok(format!("{}/{}", prefix, segments.join("/")))
}
