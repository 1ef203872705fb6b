// File: lib.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::new_without_default)]

pub mod cases;
pub mod cli;
pub mod config;
pub mod connection;
pub mod oracle;
pub mod report;
pub mod runner;
pub mod server;
pub mod wire;

#[cfg(test)]
mod wire_tests;
