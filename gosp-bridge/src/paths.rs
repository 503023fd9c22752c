use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use tracing::error;

use crate::errors::PathError;

/// Subdirectory of the work root holding worker sockets.
const SOCKET_DIR: &str = "sockets";

/// Name of the global launch lock file under the work root.
const LOCK_FILE: &str = "global.lock";

/// Join path segments under `root`, guaranteeing the result stays inside it.
///
/// A segment naming an absolute path is reinterpreted relative to the root;
/// any `..` component is rejected outright. Page paths arrive here shaped
/// by client-visible URIs, so this confinement is what keeps a request from
/// naming a socket or lock file outside the work root. Callers must never
/// concatenate request-derived strings into a filesystem path around this
/// helper.
pub fn secure_join<'a, I>(root: &Path, segments: I) -> Result<PathBuf, PathError>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut merged = root.to_path_buf();
    for segment in segments {
        for component in segment.components() {
            match component {
                // Absolute segments merge relative to the root.
                Component::RootDir | Component::Prefix(_) => continue,
                Component::CurDir => continue,
                Component::ParentDir => {
                    error!(
                        root = %root.display(),
                        segment = %segment.display(),
                        "refusing to merge a path that escapes its root"
                    );
                    return Err(PathError::Escape {
                        root: root.to_path_buf(),
                        segment: segment.to_path_buf(),
                    });
                }
                Component::Normal(part) => merged.push(part),
            }
        }
    }
    Ok(merged)
}

/// Deterministic socket path for the worker serving `page_path`:
/// `<workroot>/sockets/<page-path>.sock`.
///
/// The mapping is a pure function of the work root and the canonical page
/// path, and distinct pages never collide, so every front-end thread and
/// process converges on the same worker for the same page.
pub fn worker_socket_path(work_root: &Path, page_path: &Path) -> Result<PathBuf, PathError> {
    let merged = secure_join(work_root, [Path::new(SOCKET_DIR), page_path])?;
    let mut name: OsString = merged.into_os_string();
    name.push(".sock");
    Ok(PathBuf::from(name))
}

/// Path of the cross-process launch lock under the work root.
pub fn global_lock_path(work_root: &Path) -> PathBuf {
    work_root.join(LOCK_FILE)
}

/// Create the directory that will contain `path`, if missing.
///
/// A worker cannot bind its socket until the socket directory exists, and
/// the front end may be the first to name it.
pub fn create_parent_dirs(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
