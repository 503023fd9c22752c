//! Bridge configuration, constructed once at host startup and passed by
//! reference into everything that needs it.

pub mod duration;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::duration::{deserialize_duration, serialize_duration};

fn default_response_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_exit_wait() -> Duration {
    Duration::from_secs(3)
}

fn default_lock_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(10)
}

/// Settings shared by every request served by one [`Bridge`].
///
/// Durations deserialize from strings like `"30s"` or `"100ms"`.
///
/// [`Bridge`]: crate::Bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Directory under which worker sockets and the global lock live.
    pub work_root: PathBuf,

    /// How long a receive may go without data before the worker is
    /// presumed hung.
    #[serde(
        default = "default_response_timeout",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub response_timeout: Duration,

    /// Grace period a worker gets to exit on its own after acknowledging a
    /// termination directive, before SIGKILL.
    #[serde(
        default = "default_exit_wait",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub exit_wait: Duration,

    /// Bound on waiting for the cross-process launch lock.
    #[serde(
        default = "default_lock_timeout",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub lock_timeout: Duration,

    /// Interval between liveness probes while waiting for a worker to exit.
    #[serde(
        default = "default_poll_interval",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub poll_interval: Duration,
}

impl BridgeConfig {
    /// Configuration with default timings for the given work root.
    pub fn new(work_root: impl Into<PathBuf>) -> Self {
        Self {
            work_root: work_root.into(),
            response_timeout: default_response_timeout(),
            exit_wait: default_exit_wait(),
            lock_timeout: default_lock_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}
