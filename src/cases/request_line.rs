// File: cases/request_line.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::config::HarnessConfig;
use crate::connection::probe;
use crate::oracle::Expect;
use crate::wire::{Outcome, RequestSpec};
use std::sync::Arc;

pub async fn http_1_0(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.0\r\nHost: {}\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(505)
        .check(&response)
}

pub async fn bad_version(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "GET / HTTP/0.1\r\nHost: {}\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status_in(&[400, 505])
        .check(&response)
}
