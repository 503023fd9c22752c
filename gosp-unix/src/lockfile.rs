use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// An advisory `flock(2)` lock file.
///
/// Every process opens its own descriptor on the shared path and the kernel
/// arbitrates between them, which makes the lock visible to sibling server
/// processes spawned independently. flock locks are per open file
/// description: a single `LockFile` shared between tasks cannot exclude
/// those tasks from one another, so in-process serialization is the
/// caller's job.
#[derive(Debug)]
pub struct LockFile {
    file: File,
}

impl LockFile {
    /// Open the lock file at `path`, creating it if needed.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .mode(0o600)
            .open(path)?;
        Ok(Self { file })
    }

    /// Attempt to take the exclusive lock without blocking. Returns false
    /// when another holder has it.
    pub fn try_lock(&self) -> io::Result<bool> {
        let ret = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if ret == 0 {
            return Ok(true);
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
            Ok(false)
        } else {
            Err(err)
        }
    }

    /// Release the lock.
    pub fn unlock(&self) -> io::Result<()> {
        let ret = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_UN) };
        if ret == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}
