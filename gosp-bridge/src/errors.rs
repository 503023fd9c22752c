use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

use gosp_wire::WireError;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("path segment {segment:?} escapes the confinement root {root}")]
    Escape { root: PathBuf, segment: PathBuf },
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("failed to open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to acquire lock on {path} within {timeout:?}")]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("failed to acquire lock on {path}: {source}")]
    Acquire {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to release lock on {path}: {source}")]
    Release {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to run launcher {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("launcher {program} exited with {status}: {stderr}")]
    Command {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("no worker listening on {socket_path}")]
    WorkerAbsent { socket_path: PathBuf },

    #[error("failed to connect to worker socket {socket_path}: {source}")]
    Connect {
        socket_path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("failed to prepare work directory {path}: {source}")]
    Workdir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch worker for page {page_path}: {source}")]
    Launch {
        page_path: PathBuf,
        #[source]
        source: LaunchError,
    },

    #[error("failed to kill worker process {pid}: {source}")]
    Kill {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("worker on {socket_path} still unavailable after relaunch")]
    WorkerUnresponsive { socket_path: PathBuf },
}

impl BridgeError {
    /// True for the recoverable class of failure: the worker is absent or
    /// presumed hung and a single kill-and-relaunch attempt is warranted.
    /// Everything else is fatal for the current request.
    pub fn needs_relaunch(&self) -> bool {
        matches!(
            self,
            BridgeError::WorkerAbsent { .. } | BridgeError::Wire(WireError::ResponseTimeout)
        )
    }

    /// True when the failure was a receive timeout, meaning a worker
    /// process is presumed alive but hung and must be killed before a
    /// relaunch can reuse its socket.
    pub fn worker_hung(&self) -> bool {
        matches!(self, BridgeError::Wire(WireError::ResponseTimeout))
    }
}
