// File: cases/keep_alive.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::config::HarnessConfig;
use crate::connection::{Connection, SendOptions};
use crate::oracle::Expect;
use crate::wire::{Outcome, RequestSpec};
use std::sync::Arc;

/// Two requests over one connection. The second decode fails with a reset
/// if the server dropped the connection despite HTTP/1.1 default
/// persistence.
pub async fn two_requests(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::get("/").header("Host", config.server_name());
    let mut conn = Connection::new(Arc::clone(&config));

    let first = conn.send_with(&spec, SendOptions::keep_alive()).await;
    let mismatch = Expect::new()
        .outcome(Outcome::Completed)
        .status(200)
        .check(&first);
    if !mismatch.is_empty() {
        return format!("first request: {}", mismatch);
    }

    let second = conn.send(&spec).await;
    let mismatch = Expect::new()
        .outcome(Outcome::Completed)
        .status(200)
        .check(&second);
    if !mismatch.is_empty() {
        return format!("second request: {}", mismatch);
    }
    String::new()
}
