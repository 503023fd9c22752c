use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::LaunchError;

/// External collaborator that makes sure a worker for a page is built and
/// listening. Implementations own compilation, staleness decisions, and
/// process creation; the bridge only says when.
///
/// Called exclusively while the global launch lock is held, so
/// implementations never race each other for the same page.
#[async_trait]
pub trait WorkerLauncher: Send + Sync {
    /// Make sure a worker for `page_path` is listening on `socket_path`,
    /// compiling and launching as needed.
    async fn ensure_worker_built(
        &self,
        page_path: &Path,
        socket_path: &Path,
    ) -> Result<(), LaunchError>;
}

#[async_trait]
impl<T: WorkerLauncher + ?Sized> WorkerLauncher for Arc<T> {
    async fn ensure_worker_built(
        &self,
        page_path: &Path,
        socket_path: &Path,
    ) -> Result<(), LaunchError> {
        (**self).ensure_worker_built(page_path, socket_path).await
    }
}

/// Launcher that delegates to an external compile-and-launch command,
/// invoked as `<program> [args...] <page-path> <socket-path>`. The command
/// is expected to return zero once the worker is listening.
pub struct CommandLauncher {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an extra argument placed before the page and socket paths.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

#[async_trait]
impl WorkerLauncher for CommandLauncher {
    async fn ensure_worker_built(
        &self,
        page_path: &Path,
        socket_path: &Path,
    ) -> Result<(), LaunchError> {
        info!(
            page = %page_path.display(),
            socket = %socket_path.display(),
            "launching worker"
        );
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(page_path)
            .arg(socket_path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| LaunchError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;
        if !output.status.success() {
            return Err(LaunchError::Command {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        debug!(page = %page_path.display(), "worker launch command succeeded");
        Ok(())
    }
}

/// True when `first` was modified strictly more recently than `second`.
///
/// A missing `second` counts as "not newer"; a `first` that cannot be
/// stat'ed is an error. Launcher implementations use this to decide
/// whether a cached worker binary is stale relative to its page source.
pub fn is_newer_than(first: &Path, second: &Path) -> std::io::Result<bool> {
    let second_mtime = match std::fs::metadata(second) {
        Ok(meta) => meta.modified()?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    let first_mtime = std::fs::metadata(first)?.modified()?;
    Ok(first_mtime > second_mtime)
}
