use super::*;

/// Inverse of the wire escaping rule, for round-trip checks.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

// ========================================================================
// Escaping
// ========================================================================

#[test]
fn escape_leaves_plain_strings_untouched() {
    assert!(matches!(escape("hello world"), Cow::Borrowed(_)));
    assert_eq!(escape("hello world"), "hello world");
}

#[test]
fn escape_quotes_and_backslashes() {
    assert_eq!(escape(r#"a"b"#), r#"a\"b"#);
    assert_eq!(escape(r"a\b"), r"a\\b");
    assert_eq!(escape(r#"\""#), r#"\\\""#);
}

#[test]
fn escape_does_not_touch_control_characters() {
    // Only backslash and quote are transformed; a newline passes through.
    assert_eq!(escape("a\nb"), "a\nb");
}

#[test]
fn escape_round_trips() {
    let cases = [
        "",
        "plain",
        r#"quote " inside"#,
        r"trailing backslash \",
        r#"\\ ""both"" \\"#,
        "unicode \u{00e9}\u{4e16}",
    ];
    for s in cases {
        assert_eq!(unescape(&escape(s)), s, "round trip failed for {s:?}");
    }
}

// ========================================================================
// Request framing
// ========================================================================

#[test]
fn request_renders_exact_wire_format() {
    let request = WorkerRequest {
        local_hostname: "www.example.com",
        query_args: "a=1&b=2",
        path_info: "/extra",
        uri: "/page.gosp/extra",
        remote_hostname: "client.example.net",
    };
    let expected = "{\n\
                    \x20 \"LocalHostname\": \"www.example.com\",\n\
                    \x20 \"QueryArgs\": \"a=1&b=2\",\n\
                    \x20 \"PathInfo\": \"/extra\",\n\
                    \x20 \"Uri\": \"/page.gosp/extra\",\n\
                    \x20 \"RemoteHostname\": \"client.example.net\"\n\
                    }\n";
    assert_eq!(request.to_wire(), expected);
}

#[test]
fn absent_fields_render_as_empty_strings() {
    let wire = WorkerRequest::default().to_wire();
    assert!(wire.contains("\"QueryArgs\": \"\""));
    assert!(wire.contains("\"RemoteHostname\": \"\""));
}

#[test]
fn request_fields_are_escaped() {
    let request = WorkerRequest {
        uri: r#"/odd"name.gosp"#,
        ..Default::default()
    };
    assert!(request.to_wire().contains(r#""Uri": "/odd\"name.gosp""#));
}

#[test]
fn termination_request_is_the_exit_now_directive() {
    assert_eq!(termination_request(), "{\n  \"ExitNow\": \"true\"\n}\n");
}
