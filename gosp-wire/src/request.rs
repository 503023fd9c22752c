use std::borrow::Cow;

use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;

use crate::errors::WireError;

/// The routing-relevant fields of one HTTP request, in the shape the worker
/// expects them.
///
/// The rendered field names are a cross-process contract with the worker's
/// request decoder and must not be renamed or reordered. Absent values are
/// carried as empty strings, never as omitted fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerRequest<'a> {
    pub local_hostname: &'a str,
    pub query_args: &'a str,
    pub path_info: &'a str,
    pub uri: &'a str,
    pub remote_hostname: &'a str,
}

impl WorkerRequest<'_> {
    /// Render the request in the worker's wire format.
    pub fn to_wire(&self) -> String {
        let mut msg = String::with_capacity(128);
        msg.push_str("{\n");
        push_field(&mut msg, "LocalHostname", self.local_hostname, true);
        push_field(&mut msg, "QueryArgs", self.query_args, true);
        push_field(&mut msg, "PathInfo", self.path_info, true);
        push_field(&mut msg, "Uri", self.uri, true);
        push_field(&mut msg, "RemoteHostname", self.remote_hostname, false);
        msg.push_str("}\n");
        msg
    }
}

fn push_field(msg: &mut String, name: &str, value: &str, comma: bool) {
    msg.push_str("  \"");
    msg.push_str(name);
    msg.push_str("\": \"");
    msg.push_str(&escape(value));
    msg.push('"');
    if comma {
        msg.push(',');
    }
    msg.push('\n');
}

/// Escape a string for inclusion in a wire message: backslash and double
/// quote are each prefixed with a backslash. Nothing else is transformed,
/// so this is not general JSON escaping and must not be replaced with one.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['\\', '"']) {
        return Cow::Borrowed(s);
    }
    let mut escaped = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        if c == '\\' || c == '"' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// The single-field directive asking a worker to exit cleanly. Same framing
/// and escaping rules as a page request.
pub fn termination_request() -> &'static str {
    "{\n  \"ExitNow\": \"true\"\n}\n"
}

/// Send an encoded page request over the worker socket.
pub async fn send_request(
    stream: &mut UnixStream,
    request: &WorkerRequest<'_>,
) -> Result<(), WireError> {
    stream
        .write_all(request.to_wire().as_bytes())
        .await
        .map_err(WireError::Send)
}

/// Send the termination directive over the worker socket.
pub async fn send_termination(stream: &mut UnixStream) -> Result<(), WireError> {
    stream
        .write_all(termination_request().as_bytes())
        .await
        .map_err(WireError::Send)
}

#[cfg(test)]
mod tests;
