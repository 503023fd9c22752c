use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use gosp_unix::LockFile;

use crate::errors::LockError;

/// Interval between non-blocking lock attempts while waiting.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// The cross-process mutex serializing worker launch decisions.
///
/// The flock on the lock file excludes sibling front-end processes; the
/// in-process mutex serializes tasks within one process, since flock
/// cannot tell two tasks on the same descriptor apart. Each process opens
/// its own `GlobalLock` on the shared path, so independently spawned
/// children all attach to the same lock.
///
/// The critical section this guards is the launch decision and its
/// trigger, never the request/response exchange itself; one slow worker
/// must not stall unrelated pages.
#[derive(Debug)]
pub struct GlobalLock {
    path: PathBuf,
    timeout: Duration,
    local: Mutex<LockFile>,
}

impl GlobalLock {
    /// Open the lock file backing this lock, creating it if needed.
    pub fn open(path: impl Into<PathBuf>, timeout: Duration) -> Result<Self, LockError> {
        let path = path.into();
        let file = LockFile::open(&path).map_err(|e| LockError::Open {
            path: path.clone(),
            source: e,
        })?;
        Ok(Self {
            path,
            timeout,
            local: Mutex::new(file),
        })
    }

    /// Acquire the lock, waiting at most the configured timeout across
    /// both the in-process and cross-process stages.
    pub async fn acquire(&self) -> Result<GlobalLockGuard<'_>, LockError> {
        let deadline = Instant::now() + self.timeout;
        let file = tokio::time::timeout(self.timeout, self.local.lock())
            .await
            .map_err(|_| LockError::Timeout {
                path: self.path.clone(),
                timeout: self.timeout,
            })?;
        loop {
            match file.try_lock() {
                Ok(true) => {
                    debug!(path = %self.path.display(), "acquired global launch lock");
                    return Ok(GlobalLockGuard {
                        file,
                        path: &self.path,
                        released: false,
                    });
                }
                Ok(false) => {}
                Err(e) => {
                    return Err(LockError::Acquire {
                        path: self.path.clone(),
                        source: e,
                    })
                }
            }
            if Instant::now() >= deadline {
                return Err(LockError::Timeout {
                    path: self.path.clone(),
                    timeout: self.timeout,
                });
            }
            sleep(LOCK_RETRY_INTERVAL).await;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Holder of the global launch lock.
#[must_use = "dropping the guard releases the lock"]
#[derive(Debug)]
pub struct GlobalLockGuard<'a> {
    file: tokio::sync::MutexGuard<'a, LockFile>,
    path: &'a Path,
    released: bool,
}

impl GlobalLockGuard<'_> {
    /// Release the lock, surfacing unlock errors. A lock that cannot be
    /// released wedges every later launch decision on this host, so the
    /// error must not be swallowed.
    pub fn release(mut self) -> Result<(), LockError> {
        self.released = true;
        self.file.unlock().map_err(|e| LockError::Release {
            path: self.path.to_path_buf(),
            source: e,
        })
    }
}

impl Drop for GlobalLockGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            warn!(path = %self.path.display(), "global lock guard dropped without explicit release");
            let _ = self.file.unlock();
        }
    }
}

#[cfg(test)]
mod tests;
