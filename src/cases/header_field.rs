// File: cases/header_field.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RFC 7230 3.2.4 field-parsing cases. All of these need the raw request
//! form: a conformant builder would refuse to construct them.

use crate::config::HarnessConfig;
use crate::connection::probe;
use crate::oracle::Expect;
use crate::wire::{Outcome, RequestSpec};
use std::sync::Arc;

/// Whitespace between field name and colon was historically an injection
/// vector; the server must answer 400, both for Host and for any other
/// header.
pub async fn space_before_colon(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.1\r\nHost :{}\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    let mismatch = Expect::new()
        .outcome(Outcome::Completed)
        .status(400)
        .check(&response);
    if !mismatch.is_empty() {
        return mismatch;
    }

    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.1\r\nHost:{}\r\nAccept-Language :fr\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(400)
        .check(&response)
}

pub async fn empty_name(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.1\r\nHost:{}\r\n:empty_name\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status_class(4)
        .check(&response)
}

pub async fn missing_colon(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.1\r\nHost:{}\r\nnocolonhere\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status_class(4)
        .check(&response)
}

pub async fn empty_value(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.1\r\nHost:{}\r\nempty_data:\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status_class(4)
        .check(&response)
}

pub async fn mandatory_headers(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::get("/").header("Host", config.server_name());
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(200)
        .header_present("Content-Length")
        .header_present("Date")
        .check(&response)
}

pub async fn missing_host(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw("GET / HTTP/1.1\r\n\r\n");
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(400)
        .check(&response)
}

/// More than one Host header is a hard 400, whether or not the values
/// agree.
pub async fn duplicate_host(config: Arc<HarnessConfig>) -> String {
    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.1\r\nHost: {}\r\nHost: elsewhere.example\r\n\r\n",
        config.server_name()
    ));
    let response = probe(&config, &spec).await;
    let mismatch = Expect::new()
        .outcome(Outcome::Completed)
        .status(400)
        .check(&response);
    if !mismatch.is_empty() {
        return mismatch;
    }

    let spec = RequestSpec::raw(format!(
        "GET / HTTP/1.1\r\nHost: {name}\r\nHost: {name}\r\n\r\n",
        name = config.server_name()
    ));
    let response = probe(&config, &spec).await;
    Expect::new()
        .outcome(Outcome::Completed)
        .status(400)
        .check(&response)
}
