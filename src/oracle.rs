// File: oracle.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::wire::{Outcome, Response};

const BODY_PREVIEW_BYTES: usize = 64;

/// One composable predicate over a decoded response.
#[derive(Debug, Clone)]
enum Check {
    Outcome(Outcome),
    Status(u16),
    StatusIn(Vec<u16>),
    StatusClass(u16),
    HeaderPresent(String),
    HeaderEquals(String, String),
    HeaderAbsent(String),
    BodyEquals(Vec<u8>),
    BodyContains(String),
    BodyMatchesContentLength,
}

/// Declarative expectation against a decoded response. `check` returns an
/// empty string on success or a description naming both the observed and
/// the expected value; that string is the test's public contract.
#[derive(Debug, Clone, Default)]
pub struct Expect {
    checks: Vec<Check>,
}

impl Expect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.checks.push(Check::Outcome(outcome));
        self
    }

    pub fn status(mut self, code: u16) -> Self {
        self.checks.push(Check::Status(code));
        self
    }

    /// Pass when the status is any of `codes`. Used where the protocol
    /// allows more than one correct answer, e.g. 301/302/307 for redirects.
    pub fn status_in(mut self, codes: &[u16]) -> Self {
        self.checks.push(Check::StatusIn(codes.to_vec()));
        self
    }

    /// Pass on any status in the given hundreds class, e.g. 4 for 4xx.
    pub fn status_class(mut self, class: u16) -> Self {
        self.checks.push(Check::StatusClass(class));
        self
    }

    pub fn header_present(mut self, name: impl Into<String>) -> Self {
        self.checks.push(Check::HeaderPresent(name.into()));
        self
    }

    pub fn header_equals(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.checks
            .push(Check::HeaderEquals(name.into(), value.into()));
        self
    }

    pub fn header_absent(mut self, name: impl Into<String>) -> Self {
        self.checks.push(Check::HeaderAbsent(name.into()));
        self
    }

    pub fn body_equals(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.checks.push(Check::BodyEquals(body.into()));
        self
    }

    pub fn body_contains(mut self, needle: impl Into<String>) -> Self {
        self.checks.push(Check::BodyContains(needle.into()));
        self
    }

    /// Body length must equal the Content-Length header value.
    pub fn body_matches_content_length(mut self) -> Self {
        self.checks.push(Check::BodyMatchesContentLength);
        self
    }

    /// Evaluate every predicate in order; the first mismatch wins. Header
    /// value lookups use the first occurrence of the name.
    pub fn check(&self, response: &Response) -> String {
        for check in &self.checks {
            let mismatch = match check {
                Check::Outcome(expected) => {
                    if response.outcome == *expected {
                        String::new()
                    } else {
                        format!(
                            "Bad outcome: {:?}, expected: {:?}",
                            response.outcome, expected
                        )
                    }
                }
                Check::Status(expected) => {
                    if response.status == *expected {
                        String::new()
                    } else {
                        format!(
                            "Bad status code: {}, expected: {}",
                            response.status, expected
                        )
                    }
                }
                Check::StatusIn(codes) => {
                    if codes.contains(&response.status) {
                        String::new()
                    } else {
                        format!(
                            "Bad status code: {}, expected one of: {:?}",
                            response.status, codes
                        )
                    }
                }
                Check::StatusClass(class) => {
                    if response.status / 100 == *class {
                        String::new()
                    } else {
                        format!(
                            "Bad status code: {}, expected: {}XX",
                            response.status, class
                        )
                    }
                }
                Check::HeaderPresent(name) => {
                    if response.headers.contains(name) {
                        String::new()
                    } else {
                        format!("Missing header: {}", name)
                    }
                }
                Check::HeaderEquals(name, expected) => match response.headers.first(name) {
                    Some(observed) if observed == expected => String::new(),
                    Some(observed) => format!(
                        "Bad {} header: {:?}, expected: {:?}",
                        name, observed, expected
                    ),
                    None => format!("Missing header: {}", name),
                },
                Check::HeaderAbsent(name) => match response.headers.first(name) {
                    None => String::new(),
                    Some(observed) => {
                        format!("Unexpected header {}: {:?}", name, observed)
                    }
                },
                Check::BodyEquals(expected) => {
                    if &response.body == expected {
                        String::new()
                    } else {
                        format!(
                            "Bad body: {}, expected: {}",
                            preview(&response.body),
                            preview(expected)
                        )
                    }
                }
                Check::BodyContains(needle) => {
                    if response.body_text().contains(needle) {
                        String::new()
                    } else {
                        format!(
                            "Body {} does not contain: {:?}",
                            preview(&response.body),
                            needle
                        )
                    }
                }
                Check::BodyMatchesContentLength => {
                    match response.headers.first("content-length") {
                        None => "Missing header: Content-Length".to_string(),
                        Some(value) => match value.parse::<usize>() {
                            Err(_) => format!("Bad Content-Length header: {:?}", value),
                            Ok(declared) if declared == response.body.len() => String::new(),
                            Ok(declared) => format!(
                                "Bad Content-Length: {}, body is {} bytes",
                                declared,
                                response.body.len()
                            ),
                        },
                    }
                }
            };
            if !mismatch.is_empty() {
                return mismatch;
            }
        }
        String::new()
    }
}

fn preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= BODY_PREVIEW_BYTES {
        format!("{:?} ({} bytes)", text, body.len())
    } else {
        format!(
            "{:?}... ({} bytes)",
            &text[..floor_char_boundary(&text, BODY_PREVIEW_BYTES)],
            body.len()
        )
    }
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
