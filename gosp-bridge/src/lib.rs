//! Request-dispatch bridge between a front-end HTTP server and a pool of
//! per-page Gosp worker processes.
//!
//! For each requested page the bridge derives the worker's Unix-domain
//! socket path from the page's canonical on-disk path, connects, forwards
//! the request context in the worker wire format, and streams the decoded
//! response back to the host. When no worker is listening, or a worker has
//! hung, the bridge takes the cross-process launch lock, corrects the
//! situation (launch, or kill and relaunch), and retries exactly once.
//!
//! The host server owns request parsing and response delivery; it hands
//! each request to [`Bridge::handle_request`] as a [`RequestContext`] and
//! applies the returned [`PageResponse`]. Any error is the host's cue to
//! answer with an internal server error.

pub mod config;
pub mod connect;
pub mod errors;
pub mod launcher;
pub mod lifecycle;
pub mod lock;
pub mod orchestrator;
pub mod paths;

pub use config::BridgeConfig;
pub use errors::{BridgeError, LaunchError, LockError, PathError};
pub use launcher::{is_newer_than, CommandLauncher, WorkerLauncher};
pub use lifecycle::terminate_worker;
pub use orchestrator::{Bridge, PageResponse, RequestContext};

pub type Result<T> = std::result::Result<T, BridgeError>;
