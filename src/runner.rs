// File: runner.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::config::HarnessConfig;
use crate::report::{ReportEntry, TestReport, Verdict};
use chrono::Utc;
use log::{info, warn};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type CaseFuture = Pin<Box<dyn Future<Output = String> + Send>>;
pub type CaseFn = fn(Arc<HarnessConfig>) -> CaseFuture;

/// A named conformance case. Constructed once at registration, invoked
/// exactly once per run, never retried. The future resolves to an empty
/// string on pass or a human-readable failure description.
pub struct TestCase {
    pub name: &'static str,
    pub run: CaseFn,
}

impl TestCase {
    pub fn new(name: &'static str, run: CaseFn) -> Self {
        Self { name, run }
    }
}

/// Runs registered cases sequentially in registration order. A case that
/// panics is recorded as a harness fault and the suite keeps going; one
/// broken case must never take down the rest of the run.
pub struct Runner {
    config: Arc<HarnessConfig>,
    cases: Vec<TestCase>,
}

impl Runner {
    pub fn new(config: Arc<HarnessConfig>) -> Self {
        Self {
            config,
            cases: Vec::new(),
        }
    }

    /// Register a case. Names are unique within a run; a duplicate is
    /// dropped with a warning rather than silently shadowing the first.
    pub fn register(&mut self, case: TestCase) {
        if self.cases.iter().any(|c| c.name == case.name) {
            warn!("duplicate test case {:?} ignored", case.name);
            return;
        }
        self.cases.push(case);
    }

    pub fn register_all(&mut self, cases: Vec<TestCase>) {
        for case in cases {
            self.register(case);
        }
    }

    pub fn case_names(&self) -> Vec<&'static str> {
        self.cases.iter().map(|c| c.name).collect()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub async fn run(self) -> TestReport {
        let started_at = Utc::now();
        let mut entries = Vec::with_capacity(self.cases.len());

        for case in &self.cases {
            info!("running {}", case.name);
            let future = (case.run)(Arc::clone(&self.config));
            // Spawned so a panicking case surfaces as a JoinError here
            // instead of unwinding through the orchestrator.
            let verdict = match tokio::spawn(future).await {
                Ok(message) if message.is_empty() => Verdict::Pass,
                Ok(message) => Verdict::Fail(message),
                Err(join_error) => {
                    warn!("case {} faulted: {}", case.name, join_error);
                    Verdict::Fault(format!("{}: {}", case.name, join_error))
                }
            };
            entries.push(ReportEntry::new(case.name, verdict));
        }

        TestReport::from_entries(entries, started_at, Utc::now())
    }
}
