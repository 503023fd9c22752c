use std::path::Path;
use std::time::Instant;

use tokio::time::sleep;
use tracing::{debug, error, info};

use gosp_unix::{force_kill, process_exists};
use gosp_wire::{parse_exit_ack, receive_response, send_termination};

use crate::config::BridgeConfig;
use crate::connect::connect_worker;
use crate::errors::BridgeError;

/// Ask the worker on `socket_path` to exit, then make sure it does.
///
/// The worker gets `exit_wait` to finish any in-flight response and leave
/// on its own before SIGKILL goes out. Forcing immediately would drop
/// responses mid-write; waiting unboundedly would leak a worker every time
/// a page is relaunched.
///
/// Failing to connect counts as success: the worker is already gone. Once
/// connected, a worker that answers the termination directive with
/// anything but its PID, or not at all, is a hard failure.
pub async fn terminate_worker(
    config: &BridgeConfig,
    socket_path: &Path,
) -> Result<(), BridgeError> {
    info!(socket = %socket_path.display(), "asking worker to terminate");
    let mut stream = match connect_worker(socket_path).await {
        Ok(stream) => stream,
        Err(BridgeError::WorkerAbsent { .. }) => {
            debug!(socket = %socket_path.display(), "no worker to terminate");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    // The worker acknowledges with its PID and then starts exiting; it
    // will not respond further, so the connection is dropped right after
    // the exchange.
    send_termination(&mut stream).await?;
    let ack = receive_response(&mut stream, config.response_timeout).await?;
    let pid = parse_exit_ack(&ack)?;
    drop(stream);
    debug!(socket = %socket_path.display(), pid, "worker acknowledged termination");

    // Give it a chance to exit on its own.
    let deadline = Instant::now() + config.exit_wait;
    while Instant::now() < deadline {
        if !process_exists(pid) {
            debug!(pid, "worker exited on its own");
            return Ok(());
        }
        sleep(config.poll_interval).await;
    }

    // Still around; force the issue.
    info!(pid, socket = %socket_path.display(), "worker did not exit in time, sending SIGKILL");
    if let Err(e) = force_kill(pid) {
        // The worker may have exited between the last probe and the kill.
        if process_exists(pid) {
            error!(pid, error = %e, "failed to kill worker; the process may be leaked");
            return Err(BridgeError::Kill { pid, source: e });
        }
    }
    Ok(())
}
