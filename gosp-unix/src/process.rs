use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

/// Probe a process for existence with the zero-effect signal.
///
/// ESRCH means no such process. Any other outcome, including EPERM, means
/// something with that PID is still around.
#[cfg(unix)]
pub fn process_exists(pid: u32) -> bool {
    match kill(Pid::from_raw(pid as i32), None) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        Err(_) => true,
    }
}

/// Forcibly terminate a process with SIGKILL.
#[cfg(unix)]
pub fn force_kill(pid: u32) -> std::io::Result<()> {
    kill(Pid::from_raw(pid as i32), Signal::SIGKILL)
        .map_err(|e| std::io::Error::from_raw_os_error(e as i32))
}

#[cfg(test)]
mod tests;
