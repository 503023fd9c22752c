//! Unix platform helpers for the Gosp bridge: process liveness probes,
//! forced termination, and the advisory lock file backing cross-process
//! mutual exclusion.

pub mod lockfile;
pub mod process;

pub use lockfile::LockFile;
pub use process::{force_kill, process_exists};
