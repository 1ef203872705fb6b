// File: cases/get.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::config::HarnessConfig;
use crate::connection::{probe, Connection, SendOptions};
use crate::oracle::Expect;
use crate::wire::{Outcome, RequestSpec};
use std::sync::Arc;

pub async fn root(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::get("/").header("Host", config.server_name());
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(200)
        .header_present("Date")
        .body_matches_content_length()
        .check(&response)
}

/// A deeply nonexistent path must draw exactly 404, not any other 4xx.
pub async fn missing_resource(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::get("/doidjodoeijdosejfoejfseoifjseiofjsejfsejfesjfseofsejiseofj")
        .header("Host", config.server_name());
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(404)
        .check(&response)
}

pub async fn unknown_method(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::structured("UNKNOWN", "/").header("Host", config.server_name());
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status_in(&[405, 501])
        .check(&response)
}

/// A deployment listening on more than one port must answer on all of
/// them. Checks the primary port first, then the second when one is
/// configured.
pub async fn second_port(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::get("/").header("Host", config.server_name());
    let response = probe(&config, &spec).await;
    let mismatch = Expect::new()
        .outcome(Outcome::Completed)
        .status(200)
        .check(&response);
    if !mismatch.is_empty() {
        return format!("first port: {}", mismatch);
    }

    let Some(port) = config.second_port() else {
        return String::new();
    };
    let mut conn = Connection::to_port(Arc::clone(&config), port);
    let response = conn.send(&spec).await;
    let mismatch = Expect::new()
        .outcome(Outcome::Completed)
        .status(200)
        .check(&response);
    if !mismatch.is_empty() {
        return format!("second port: {}", mismatch);
    }
    String::new()
}

/// Whatever status a HEAD draws, the response must not carry a body.
pub async fn head_has_no_body(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::structured("HEAD", "/").header("Host", config.server_name());
    let mut conn = Connection::new(Arc::clone(&config));
    let opts = SendOptions {
        keep_alive: false,
        head_response: true,
    };
    let response = conn.send_with(&spec, opts).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status_in(&[200, 501])
        .body_equals(Vec::new())
        .check(&response)
}
