use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;

use super::*;

fn wire(headers: &[&str], body: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for line in headers {
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
    }
    bytes.extend_from_slice(b"end-header\n");
    bytes.extend_from_slice(body);
    bytes
}

// ========================================================================
// parse_response
// ========================================================================

#[test]
fn body_passes_through_byte_for_byte() {
    let body = b"<html>\xff\x00\xfe not text</html>";
    let decoded = parse_response(&wire(&["http-status 200"], body)).unwrap();
    assert_eq!(decoded.status, 200);
    assert_eq!(decoded.body, body);
}

#[test]
fn defaults_to_status_200_with_no_directives() {
    let decoded = parse_response(&wire(&[], b"hello")).unwrap();
    assert_eq!(decoded.status, 200);
    assert_eq!(decoded.content_type, None);
    assert_eq!(decoded.body, b"hello");
}

#[test]
fn non_success_status_discards_the_body() {
    let decoded = parse_response(&wire(&["http-status 404"], b"ignored bytes")).unwrap();
    assert_eq!(decoded.status, 404);
    assert!(decoded.body.is_empty());
}

#[test]
fn mime_type_is_taken_verbatim() {
    let decoded =
        parse_response(&wire(&["mime-type text/plain; charset=utf-8"], b"x")).unwrap();
    assert_eq!(
        decoded.content_type.as_deref(),
        Some("text/plain; charset=utf-8")
    );
}

#[test]
fn keep_alive_heartbeats_are_ignored() {
    let decoded = parse_response(&wire(
        &["keep-alive", "keep-alive", "http-status 200", "keep-alive"],
        b"body",
    ))
    .unwrap();
    assert_eq!(decoded.status, 200);
    assert_eq!(decoded.body, b"body");
}

#[test]
fn empty_header_lines_are_skipped() {
    let decoded = parse_response(b"\n\nhttp-status 204\n\nend-header\n").unwrap();
    assert_eq!(decoded.status, 204);
}

#[test]
fn unknown_directive_is_a_hard_failure() {
    let err = parse_response(&wire(&["bogus-directive x"], b"")).unwrap_err();
    assert!(matches!(err, WireError::UnknownDirective(line) if line == "bogus-directive x"));
}

#[test]
fn status_below_100_is_a_hard_failure() {
    let err = parse_response(&wire(&["http-status 42"], b"")).unwrap_err();
    assert!(matches!(err, WireError::BadStatus(_)));
}

#[test]
fn garbage_status_is_a_hard_failure() {
    let err = parse_response(&wire(&["http-status abc"], b"")).unwrap_err();
    assert!(matches!(err, WireError::BadStatus(_)));
}

#[test]
fn non_utf8_header_line_is_a_hard_failure() {
    let err = parse_response(b"\xff\xfe\n end-header\n").unwrap_err();
    assert!(matches!(err, WireError::HeaderNotUtf8));
}

#[test]
fn missing_sentinel_yields_headers_without_body() {
    let decoded = parse_response(b"http-status 503\nmime-type text/html\n").unwrap();
    assert_eq!(decoded.status, 503);
    assert_eq!(decoded.content_type.as_deref(), Some("text/html"));
    assert!(decoded.body.is_empty());
}

#[test]
fn sentinel_at_end_of_stream_yields_empty_body() {
    let decoded = parse_response(b"http-status 200\nend-header").unwrap();
    assert_eq!(decoded.status, 200);
    assert!(decoded.body.is_empty());
}

#[test]
fn empty_response_decodes_to_defaults() {
    let decoded = parse_response(b"").unwrap();
    assert_eq!(decoded, DecodedResponse::default());
}

#[test]
fn body_may_contain_directive_lookalikes() {
    let body = b"bogus-directive x\nend-header\n";
    let decoded = parse_response(&wire(&[], body)).unwrap();
    assert_eq!(decoded.body, body);
}

// ========================================================================
// parse_exit_ack
// ========================================================================

#[test]
fn exit_ack_parses_a_pid() {
    assert_eq!(parse_exit_ack(b"gosp-pid 4242").unwrap(), 4242);
    assert_eq!(parse_exit_ack(b"gosp-pid 1\n").unwrap(), 1);
    assert_eq!(parse_exit_ack(b"gosp-pid 2147483647").unwrap(), i32::MAX as u32);
}

#[test]
fn exit_ack_rejects_garbage() {
    // Values past i32::MAX would wrap into zero or negative PIDs when
    // delivered to the kernel; 4294967295 is kill(-1, ...), every
    // signalable process on the host.
    for bad in [
        &b"gosp-pid 0"[..],
        b"gosp-pid -5",
        b"gosp-pid 2147483648",
        b"gosp-pid 4294967295",
        b"gosp-pid abc",
        b"gosp-pid ",
        b"pid 42",
        b"",
    ] {
        assert!(
            matches!(parse_exit_ack(bad), Err(WireError::BadExitAck(_))),
            "accepted {bad:?}"
        );
    }
}

// ========================================================================
// receive_response
// ========================================================================

#[tokio::test]
async fn receive_collects_until_peer_closes() {
    let (mut ours, mut theirs) = UnixStream::pair().unwrap();
    let payload = wire(&["http-status 200"], b"chunked body");
    let writer = {
        let payload = payload.clone();
        tokio::spawn(async move {
            // Two writes with a pause in between; EOF only after both.
            theirs.write_all(&payload[..5]).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            theirs.write_all(&payload[5..]).await.unwrap();
        })
    };
    let received = receive_response(&mut ours, Duration::from_secs(5))
        .await
        .unwrap();
    writer.await.unwrap();
    assert_eq!(received, payload);
}

#[tokio::test]
async fn receive_times_out_when_no_data_arrives() {
    let (mut ours, _theirs) = UnixStream::pair().unwrap();
    let err = receive_response(&mut ours, Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn receive_of_an_immediately_closed_stream_is_empty() {
    let (mut ours, theirs) = UnixStream::pair().unwrap();
    drop(theirs);
    let received = receive_response(&mut ours, Duration::from_secs(1))
        .await
        .unwrap();
    assert!(received.is_empty());
}
