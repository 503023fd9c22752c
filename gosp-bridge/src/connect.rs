use std::io;
use std::path::Path;

use tokio::net::UnixStream;
use tracing::{debug, error};

use crate::errors::BridgeError;

/// Open a client connection to a worker's Unix-domain socket.
///
/// A missing socket file or a refused connection means no worker is
/// listening; that comes back as [`BridgeError::WorkerAbsent`] so the
/// caller can decide to launch one. Any other failure is a local resource
/// problem and fatal for the request. Retry policy belongs to the
/// orchestrator; no retries happen here.
pub async fn connect_worker(socket_path: &Path) -> Result<UnixStream, BridgeError> {
    match UnixStream::connect(socket_path).await {
        Ok(stream) => {
            debug!(socket = %socket_path.display(), "connected to worker");
            Ok(stream)
        }
        Err(e) if worker_absent(&e) => {
            debug!(socket = %socket_path.display(), error = %e, "no worker listening");
            Err(BridgeError::WorkerAbsent {
                socket_path: socket_path.to_path_buf(),
            })
        }
        Err(e) => {
            error!(socket = %socket_path.display(), error = %e, "failed to open worker socket");
            Err(BridgeError::Connect {
                socket_path: socket_path.to_path_buf(),
                source: e,
            })
        }
    }
}

/// Connection failures that mean "no worker is listening", as opposed to a
/// local resource or environment problem.
fn worker_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused
    )
}
