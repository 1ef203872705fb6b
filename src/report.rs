// File: report.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{Result, Write};

/// Result of one test case. `Fail` is a protocol non-compliance finding
/// with the oracle's mismatch description; `Fault` means the case itself
/// blew up, which is a harness bug, not a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum Verdict {
    Pass,
    Fail(String),
    Fault(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub verdict: Verdict,
}

impl ReportEntry {
    pub fn new(name: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            name: name.into(),
            verdict,
        }
    }
}

/// Immutable summary of one orchestrator run: every case in execution
/// order, plus derived counts.
#[derive(Debug, Serialize)]
pub struct TestReport {
    pub entries: Vec<ReportEntry>,
    pub passed: usize,
    pub failed: usize,
    pub faulted: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl TestReport {
    pub fn from_entries(
        entries: Vec<ReportEntry>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let passed = entries
            .iter()
            .filter(|e| e.verdict == Verdict::Pass)
            .count();
        let failed = entries
            .iter()
            .filter(|e| matches!(e.verdict, Verdict::Fail(_)))
            .count();
        let faulted = entries
            .iter()
            .filter(|e| matches!(e.verdict, Verdict::Fault(_)))
            .count();
        Self {
            entries,
            passed,
            failed,
            faulted,
            started_at,
            finished_at,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.faulted == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }
}

pub enum ReportFormat {
    Text,
    Json,
}

/// Rendering lives here, apart from the orchestrator, so the presentation
/// can change without touching verdict bookkeeping.
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn render(report: &TestReport, format: ReportFormat, out: &mut dyn Write) -> Result<()> {
        match format {
            ReportFormat::Text => Self::render_text(report, out),
            ReportFormat::Json => Self::render_json(report, out),
        }
    }

    pub fn render_text(report: &TestReport, out: &mut dyn Write) -> Result<()> {
        for entry in &report.entries {
            match &entry.verdict {
                Verdict::Pass => {
                    writeln!(out, "{:40} {}", entry.name, "PASS".green())?;
                }
                Verdict::Fail(detail) => {
                    writeln!(out, "{:40} {} {}", entry.name, "FAIL".red(), detail.red())?;
                }
                Verdict::Fault(detail) => {
                    writeln!(
                        out,
                        "{:40} {} {}",
                        entry.name,
                        "FAULT".yellow(),
                        detail.yellow()
                    )?;
                }
            }
        }
        let duration = report
            .finished_at
            .signed_duration_since(report.started_at)
            .num_milliseconds();
        writeln!(
            out,
            "\n{} tests, {} passed, {} failed, {} harness faults in {} ms",
            report.entries.len(),
            report.passed,
            report.failed,
            report.faulted,
            duration
        )?;
        Ok(())
    }

    pub fn render_json(report: &TestReport, out: &mut dyn Write) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        writeln!(out, "{}", json)?;
        Ok(())
    }

    pub fn write_file(report: &TestReport, output_path: &str, format: ReportFormat) -> Result<()> {
        let mut file = File::create(output_path)?;
        Self::render(report, format, &mut file)
    }
}
