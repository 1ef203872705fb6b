// File: cases/chunked.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::config::HarnessConfig;
use crate::connection::probe;
use crate::oracle::Expect;
use crate::wire::{Outcome, RequestFraming, RequestSpec};
use std::sync::Arc;

pub async fn post(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::post("/post/tmp/chunked")
        .header("Host", config.server_name())
        .body("Hello, World!!!")
        .framing(RequestFraming::Chunked {
            chunk_sizes: vec![5, 7],
        });
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status_class(2)
        .check(&response)
}

/// Trailer headers after the terminal chunk must be consumed, not treated
/// as a second request.
pub async fn with_trailer(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "POST /post/tmp/chunked HTTP/1.1\r\nHost: {}\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n0\r\nX-Checksum: deadbeef\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status_class(2)
        .check(&response)
}

/// `00000` is still a zero-size chunk and terminates the body.
pub async fn zero_padded_last_chunk(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "POST /post/tmp/chunked HTTP/1.1\r\nHost: {}\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n00000\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status_class(2)
        .check(&response)
}
