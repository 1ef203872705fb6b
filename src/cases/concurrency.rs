// File: cases/concurrency.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::config::HarnessConfig;
use crate::connection::probe;
use crate::oracle::Expect;
use crate::wire::{Outcome, RequestSpec};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;

const TOTAL_REQUESTS: usize = 100;

/// The one sanctioned departure from sequential execution: 100 identical
/// GETs through independently owned connections, bounded by a fixed worker
/// count. Every sub-request decodes on its own; failures are collected into
/// a single aggregated verdict.
pub async fn hundred_gets(config: Arc<HarnessConfig>) -> String {
    let semaphore = Arc::new(Semaphore::new(config.workers()));
    let mut in_flight = FuturesUnordered::new();

    for i in 0..TOTAL_REQUESTS {
        let config = Arc::clone(&config);
        let semaphore = Arc::clone(&semaphore);
        in_flight.push(tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return (i, None),
            };
            let spec = RequestSpec::get("/").header("Host", config.server_name());
            (i, Some(probe(&config, &spec).await))
        }));
    }

    let mut failures = Vec::new();
    let mut reference_body: Option<Vec<u8>> = None;
    while let Some(joined) = in_flight.next().await {
        match joined {
            Ok((i, Some(response))) => {
                let mismatch = Expect::new()
                    .outcome(Outcome::Completed)
                    .status(200)
                    .check(&response);
                if !mismatch.is_empty() {
                    failures.push(format!("request {}: {}", i, mismatch));
                } else if let Some(reference) = &reference_body {
                    if *reference != response.body {
                        failures.push(format!("request {}: body differs", i));
                    }
                } else {
                    reference_body = Some(response.body);
                }
            }
            Ok((i, None)) => failures.push(format!("request {}: worker pool closed", i)),
            Err(e) => failures.push(format!("worker panicked: {}", e)),
        }
    }

    if failures.is_empty() {
        String::new()
    } else {
        let total_failed = failures.len();
        failures.truncate(10);
        format!(
            "{} of {} requests failed: {}",
            total_failed,
            TOTAL_REQUESTS,
            failures.join("; ")
        )
    }
}
