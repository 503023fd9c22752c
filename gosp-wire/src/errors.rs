use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("failed to send request to worker: {0}")]
    Send(#[source] std::io::Error),

    #[error("timed out waiting for data from worker")]
    ResponseTimeout,

    #[error("failed to receive data from worker: {0}")]
    Receive(#[source] std::io::Error),

    #[error("response header line is not valid UTF-8")]
    HeaderNotUtf8,

    #[error("invalid http-status directive: {0:?}")]
    BadStatus(String),

    #[error("unrecognized header directive: {0:?}")]
    UnknownDirective(String),

    #[error("malformed termination acknowledgment: {0:?}")]
    BadExitAck(String),
}

impl WireError {
    /// True when the worker produced no data before the receive timeout and
    /// is presumed hung. This is the one wire-level failure a caller may
    /// recover from, by killing and relaunching the worker.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WireError::ResponseTimeout)
    }
}
