use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::UnixStream;
use tokio::time::timeout;
use tracing::debug;

use crate::errors::WireError;

/// Sentinel line separating header directives from body bytes.
pub const END_HEADER: &str = "end-header";

/// The only status for which a worker response carries a body.
pub const HTTP_OK: u16 = 200;

/// Bytes read from the socket per recv call.
const RECV_CHUNK_SIZE: usize = 64 * 1024;

/// Prefix of the termination acknowledgment line.
const EXIT_ACK_PREFIX: &str = "gosp-pid ";

/// A worker response with its header directives applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Default for DecodedResponse {
    fn default() -> Self {
        Self {
            status: HTTP_OK,
            content_type: None,
            body: Vec::new(),
        }
    }
}

/// Read a complete response off the socket.
///
/// The worker signals end-of-message by closing its end of the connection,
/// so reads accumulate until a clean EOF. A read that produces neither data
/// nor EOF within `response_timeout` means the worker is presumed hung and
/// the caller should kill and relaunch it.
pub async fn receive_response(
    stream: &mut UnixStream,
    response_timeout: Duration,
) -> Result<Vec<u8>, WireError> {
    let mut response = Vec::new();
    let mut chunk = vec![0u8; RECV_CHUNK_SIZE];
    loop {
        let n = timeout(response_timeout, stream.read(&mut chunk))
            .await
            .map_err(|_| WireError::ResponseTimeout)?
            .map_err(WireError::Receive)?;
        if n == 0 {
            debug!(bytes = response.len(), "worker closed the response stream");
            return Ok(response);
        }
        response.extend_from_slice(&chunk[..n]);
    }
}

/// Split a raw response into header directives and body bytes.
///
/// Lines before the `end-header` sentinel are directives: `keep-alive`
/// (a heartbeat, ignored), `http-status <code>` (codes below 100 and
/// non-numeric codes are protocol errors), and `mime-type <value>` (taken
/// verbatim). Any other non-empty line is a protocol error; directives are
/// not forward-compatible.
///
/// The body starts at the byte offset just past the sentinel's own newline
/// and is kept byte-for-byte; it may not be valid text, so its extent is
/// never re-derived from a textual view. The body is surfaced only for a
/// 200 status; for anything else the headers alone determine the outward
/// response. A response with no sentinel decodes to its headers with an
/// empty body.
pub fn parse_response(bytes: &[u8]) -> Result<DecodedResponse, WireError> {
    let mut decoded = DecodedResponse::default();
    let mut offset = 0;
    while offset < bytes.len() {
        let rest = &bytes[offset..];
        let (line_bytes, next_offset) = match rest.iter().position(|&b| b == b'\n') {
            Some(i) => (&rest[..i], offset + i + 1),
            None => (rest, bytes.len()),
        };
        offset = next_offset;

        if line_bytes.is_empty() {
            continue;
        }
        let line = std::str::from_utf8(line_bytes).map_err(|_| WireError::HeaderNotUtf8)?;

        if line == END_HEADER {
            if decoded.status == HTTP_OK {
                decoded.body = bytes[next_offset..].to_vec();
            }
            return Ok(decoded);
        }
        if line == "keep-alive" {
            continue;
        }
        if let Some(code) = line.strip_prefix("http-status ") {
            let status: u16 = code
                .trim()
                .parse()
                .map_err(|_| WireError::BadStatus(code.to_string()))?;
            if status < 100 {
                return Err(WireError::BadStatus(code.to_string()));
            }
            decoded.status = status;
            continue;
        }
        if let Some(mime) = line.strip_prefix("mime-type ") {
            decoded.content_type = Some(mime.to_string());
            continue;
        }
        return Err(WireError::UnknownDirective(line.to_string()));
    }

    // No sentinel was ever seen: report whatever directives were set and
    // let the caller build a response from the headers alone.
    Ok(decoded)
}

/// Parse the `gosp-pid <N>` line a worker sends in acknowledgment of a
/// termination directive. A trailing newline is tolerated; anything else is
/// a protocol error.
///
/// The PID must fit a positive `pid_t`. Values beyond `i32::MAX` would
/// wrap when handed to the kernel (4294967295 becomes -1, which addresses
/// every signalable process), so they are rejected here rather than
/// trusted to any caller.
pub fn parse_exit_ack(bytes: &[u8]) -> Result<u32, WireError> {
    let text = std::str::from_utf8(bytes).map_err(|_| bad_ack(bytes))?;
    let pid_text = text.strip_prefix(EXIT_ACK_PREFIX).ok_or_else(|| bad_ack(bytes))?;
    let pid: i32 = pid_text.trim_end().parse().map_err(|_| bad_ack(bytes))?;
    if pid <= 0 {
        return Err(bad_ack(bytes));
    }
    Ok(pid as u32)
}

fn bad_ack(bytes: &[u8]) -> WireError {
    WireError::BadExitAck(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests;
