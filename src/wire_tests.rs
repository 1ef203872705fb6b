// File: wire_tests.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

#[cfg(test)]
mod tests {
    use crate::wire::{
        decode_response, DecodeOptions, Outcome, RequestFraming, RequestSpec, Response,
    };
    use rstest::rstest;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    fn options() -> DecodeOptions {
        DecodeOptions::new(Duration::from_millis(500), 1 << 20)
    }

    async fn decode(bytes: &[u8]) -> Response {
        let mut reader = bytes;
        decode_response(&mut reader, options()).await
    }

    async fn decode_with(bytes: &[u8], opts: DecodeOptions) -> Response {
        let mut reader = bytes;
        decode_response(&mut reader, opts).await
    }

    #[test]
    fn encode_is_deterministic() {
        let spec = RequestSpec::get("/index.html").header("Host", "localhost");
        assert_eq!(spec.encode(), spec.encode());
        assert_eq!(
            spec.encode(),
            b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n"
        );
    }

    #[test]
    fn encode_preserves_header_order_and_duplicates() {
        let spec = RequestSpec::get("/")
            .header("Host", "a")
            .header("X-One", "1")
            .header("Host", "b");
        let bytes = spec.encode();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "GET / HTTP/1.1\r\nHost: a\r\nX-One: 1\r\nHost: b\r\n\r\n"
        );
    }

    #[test]
    fn encode_derives_content_length_from_body() {
        let spec = RequestSpec::post("/submit")
            .header("Host", "localhost")
            .body("hello");
        let text = String::from_utf8(spec.encode()).unwrap();
        assert_eq!(
            text,
            "POST /submit HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello"
        );
    }

    #[test]
    fn encode_keeps_caller_supplied_content_length() {
        let spec = RequestSpec::post("/submit")
            .header("Content-Length", "99")
            .body("hello");
        let text = String::from_utf8(spec.encode()).unwrap();
        assert_eq!(text.matches("Content-Length").count(), 1);
        assert!(text.contains("Content-Length: 99"));
    }

    #[test]
    fn encode_chunked_splits_at_explicit_sizes() {
        let spec = RequestSpec::post("/upload")
            .body("Hello, World!!!")
            .framing(RequestFraming::Chunked {
                chunk_sizes: vec![5, 7],
            });
        let text = String::from_utf8(spec.encode()).unwrap();
        assert!(text.contains("Transfer-Encoding: chunked"));
        assert!(text.ends_with("5\r\nHello\r\n7\r\n, World\r\n3\r\n!!!\r\n0\r\n\r\n"));
    }

    #[test]
    fn encode_raw_is_verbatim() {
        let bytes = b"GET / HTTP/1.1\r\nHost :broken\r\n\r\n".to_vec();
        let spec = RequestSpec::raw(bytes.clone());
        assert_eq!(spec.encode(), bytes);
    }

    #[tokio::test]
    async fn decode_content_length_body() {
        let response = decode(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nHello").await;
        assert_eq!(response.outcome, Outcome::Completed);
        assert_eq!(response.status, 200);
        assert_eq!(response.reason, "OK");
        assert_eq!(response.body, b"Hello");
    }

    #[tokio::test]
    async fn decode_empty_reason_phrase() {
        let response = decode(b"HTTP/1.1 404\r\nContent-Length: 0\r\n\r\n").await;
        assert_eq!(response.outcome, Outcome::Completed);
        assert_eq!(response.status, 404);
        assert_eq!(response.reason, "");
    }

    #[rstest]
    #[case(b"HTTP/1.0 200 OK\r\n\r\n".as_slice())]
    #[case(b"HTTP/2 200 OK\r\n\r\n".as_slice())]
    #[case(b"HTTP/1.1 20 OK\r\n\r\n".as_slice())]
    #[case(b"HTTP/1.1 2000 OK\r\n\r\n".as_slice())]
    #[case(b"HTTP/1.1 abc OK\r\n\r\n".as_slice())]
    #[case(b"HTTP/1.1 600 Nope\r\n\r\n".as_slice())]
    #[case(b"garbage\r\n\r\n".as_slice())]
    #[tokio::test]
    async fn decode_rejects_bad_status_line(#[case] wire: &[u8]) {
        let response = decode(wire).await;
        assert_eq!(response.outcome, Outcome::Malformed);
    }

    #[tokio::test]
    async fn decode_preserves_header_order_and_duplicates() {
        let response = decode(
            b"HTTP/1.1 200 OK\r\nSet-Cookie: a=1\r\nDate: now\r\nSet-Cookie: b=2\r\nContent-Length: 0\r\n\r\n",
        )
        .await;
        assert_eq!(response.outcome, Outcome::Completed);
        assert_eq!(response.headers.count("set-cookie"), 2);
        assert_eq!(response.headers.first("Set-Cookie"), Some("a=1"));
        assert_eq!(response.headers.all("SET-COOKIE"), vec!["a=1", "b=2"]);
        let names: Vec<&str> = response.headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Set-Cookie", "Date", "Set-Cookie", "Content-Length"]);
    }

    #[rstest]
    #[case::space_before_colon(b"HTTP/1.1 200 OK\r\nHost :example.com\r\n\r\n".as_slice())]
    #[case::tab_before_colon(b"HTTP/1.1 200 OK\r\nHost\t:example.com\r\n\r\n".as_slice())]
    #[case::empty_name(b"HTTP/1.1 200 OK\r\n:value\r\n\r\n".as_slice())]
    #[case::no_colon(b"HTTP/1.1 200 OK\r\nnocolon\r\n\r\n".as_slice())]
    #[case::space_in_name(b"HTTP/1.1 200 OK\r\nBad Name: x\r\n\r\n".as_slice())]
    #[tokio::test]
    async fn decode_rejects_bad_header_line(#[case] wire: &[u8]) {
        let response = decode(wire).await;
        assert_eq!(response.outcome, Outcome::Malformed);
    }

    #[tokio::test]
    async fn decode_allows_empty_header_value() {
        let response = decode(b"HTTP/1.1 200 OK\r\nX-Empty:\r\nContent-Length: 0\r\n\r\n").await;
        assert_eq!(response.outcome, Outcome::Completed);
        assert_eq!(response.headers.first("X-Empty"), Some(""));
    }

    #[tokio::test]
    async fn decode_rejects_bare_lf_line_ending() {
        let response = decode(b"HTTP/1.1 200 OK\nContent-Length: 0\r\n\r\n").await;
        assert_eq!(response.outcome, Outcome::Malformed);
    }

    #[rstest]
    #[case::negative("-1")]
    #[case::non_numeric("NOTDIGIT")]
    #[case::plus_sign("+5")]
    #[case::huge("100000000000000000000000")]
    #[tokio::test]
    async fn decode_rejects_bad_content_length(#[case] value: &str) {
        let wire = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", value);
        let response = decode(wire.as_bytes()).await;
        assert_eq!(response.outcome, Outcome::Malformed);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn decode_rejects_content_length_above_maximum() {
        let opts = DecodeOptions::new(Duration::from_millis(500), 16);
        let response =
            decode_with(b"HTTP/1.1 200 OK\r\nContent-Length: 17\r\n\r\n", opts).await;
        assert_eq!(response.outcome, Outcome::Malformed);
    }

    #[tokio::test]
    async fn decode_flags_conflicting_duplicate_content_length() {
        let response =
            decode(b"HTTP/1.1 200 OK\r\nContent-Length: 1\r\nContent-Length: 0\r\n\r\nX").await;
        assert_eq!(response.outcome, Outcome::Malformed);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn decode_collapses_agreeing_duplicate_content_length() {
        let response =
            decode(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nContent-Length: 2\r\n\r\nhi").await;
        assert_eq!(response.outcome, Outcome::Completed);
        assert_eq!(response.body, b"hi");
    }

    #[tokio::test]
    async fn decode_chunked_body() {
        let response =
            decode(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n0\r\n\r\n")
                .await;
        assert_eq!(response.outcome, Outcome::Completed);
        assert_eq!(response.body, b"Hello");
    }

    #[tokio::test]
    async fn decode_chunked_ignores_extensions() {
        let response = decode(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5;name=value\r\nHello\r\n0\r\n\r\n",
        )
        .await;
        assert_eq!(response.outcome, Outcome::Completed);
        assert_eq!(response.body, b"Hello");
    }

    #[tokio::test]
    async fn decode_chunked_consumes_trailers() {
        let response = decode(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n0\r\nX-Checksum: abc\r\n\r\n",
        )
        .await;
        assert_eq!(response.outcome, Outcome::Completed);
        assert_eq!(response.body, b"Hello");
    }

    #[tokio::test]
    async fn decode_chunked_missing_terminal_chunk_is_reset() {
        let response =
            decode(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n").await;
        assert_eq!(response.outcome, Outcome::ConnectionReset);
        assert_eq!(response.body, b"Hello");
    }

    #[tokio::test]
    async fn decode_chunked_garbage_size_line_is_malformed() {
        let response =
            decode(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nxyz\r\nHello\r\n0\r\n\r\n")
                .await;
        assert_eq!(response.outcome, Outcome::Malformed);
    }

    #[tokio::test]
    async fn decode_content_length_with_chunked_reads_chunked_but_flags() {
        let response = decode(
            b"HTTP/1.1 200 OK\r\nContent-Length: 10000\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n0\r\n\r\n",
        )
        .await;
        assert_eq!(response.outcome, Outcome::Malformed);
        assert_eq!(response.body, b"Hello");
    }

    #[tokio::test]
    async fn decode_close_delimited_body() {
        let response = decode(b"HTTP/1.1 200 OK\r\n\r\neverything until eof").await;
        assert_eq!(response.outcome, Outcome::Completed);
        assert_eq!(response.body, b"everything until eof");
    }

    #[tokio::test]
    async fn decode_premature_eof_preserves_partial_body() {
        let response = decode(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nonly this").await;
        assert_eq!(response.outcome, Outcome::ConnectionReset);
        assert_eq!(response.body, b"only this");
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn decode_204_has_no_body() {
        let response = decode(b"HTTP/1.1 204 No Content\r\nContent-Length: 5\r\n\r\n").await;
        assert_eq!(response.outcome, Outcome::Completed);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn decode_head_response_ignores_content_length() {
        let opts = options().head();
        let response =
            decode_with(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n", opts).await;
        assert_eq!(response.outcome, Outcome::Completed);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn decode_times_out_waiting_for_first_byte() {
        let (mut client, mut server) = tokio::io::duplex(64);
        // Hold the write half open without sending anything.
        let opts = DecodeOptions::new(Duration::from_millis(50), 1 << 20);
        let response = decode_response(&mut client, opts).await;
        assert_eq!(response.outcome, Outcome::TimedOut);
        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn decode_times_out_mid_body() {
        let (mut client, mut server) = tokio::io::duplex(256);
        server
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc")
            .await
            .unwrap();
        let opts = DecodeOptions::new(Duration::from_millis(50), 1 << 20);
        let response = decode_response(&mut client, opts).await;
        assert_eq!(response.outcome, Outcome::TimedOut);
        assert_eq!(response.body, b"abc");
        server.shutdown().await.unwrap();
    }
}
