// File: cases/content_length.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::config::HarnessConfig;
use crate::connection::probe;
use crate::oracle::Expect;
use crate::wire::{Outcome, RequestSpec};
use std::sync::Arc;

pub async fn negative(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.1\r\nHost:{}\r\nContent-Length: -1\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(400)
        .check(&response)
}

/// A length no implementation can buffer. The server must reject up front
/// instead of waiting for bytes that will never arrive.
pub async fn overflowing(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.1\r\nHost:{}\r\nContent-Length: 100000000000000000000000\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(400)
        .check(&response)
}

pub async fn non_numeric(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.1\r\nHost:{}\r\nContent-Length: NOTDIGIT\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(400)
        .check(&response)
}

pub async fn duplicate_differing(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.1\r\nHost:{}\r\nContent-Length: 1\r\nContent-Length: 0\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(400)
        .check(&response)
}

/// Content-Length alongside Transfer-Encoding: chunked. RFC 7230 lets a
/// server either reject outright or honor chunked framing, so the expected
/// status is the deployment's configured policy.
pub async fn with_chunked(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.1\r\nHost:{}\r\nContent-Length: 10000\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(config.ambiguous_framing_status())
        .check(&response)
}

pub async fn over_server_limit(config: Arc<HarnessConfig>) -> String {
    let payload = vec![b'a'; config.server_body_limit() + 1];
    let spec = RequestSpec::post("/post/test")
        .header("Host", config.server_name())
        .body(payload);
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(413)
        .check(&response)
}
