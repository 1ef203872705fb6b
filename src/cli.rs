// File: cli.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::HarnessConfig;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[arg(long, default_value = "127.0.0.1", help = "Target host")]
    pub host: String,

    #[arg(short = 'p', long, default_value_t = 8080, help = "Target port")]
    pub port: u16,

    #[arg(
        long = "second-port",
        help = "Additional port the deployment listens on"
    )]
    pub second_port: Option<u16>,

    #[arg(
        long = "server-name",
        default_value = "localhost",
        help = "Value sent in Host headers"
    )]
    pub server_name: String,

    #[arg(
        short = 't',
        long = "timeout",
        default_value_t = 8,
        help = "Response read timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(
        long = "connect-timeout",
        default_value_t = 3,
        help = "Connect timeout in seconds"
    )]
    pub connect_timeout: u64,

    #[arg(
        long = "max-body-size",
        default_value_t = 1 << 20,
        help = "Largest response body the decoder will accept"
    )]
    pub max_body_size: usize,

    #[arg(
        long = "server-body-limit",
        default_value_t = 1024,
        help = "Request body limit the server under test is deployed with"
    )]
    pub server_body_limit: usize,

    #[arg(
        short = 'w',
        long = "workers",
        default_value_t = 10,
        help = "Worker count for the concurrency case"
    )]
    pub workers: usize,

    #[arg(
        long = "ambiguous-framing-status",
        default_value_t = 400,
        help = "Expected status for Content-Length combined with chunked"
    )]
    pub ambiguous_framing_status: u16,

    #[arg(
        long = "server-cmd",
        help = "Launch this command as the server under test"
    )]
    pub server_cmd: Option<String>,

    #[arg(
        long = "server-config",
        help = "Configuration file passed to the server command"
    )]
    pub server_config: Option<String>,

    #[arg(
        long = "startup-grace",
        default_value_t = 3,
        help = "Seconds to wait for a launched server to start listening"
    )]
    pub startup_grace: u64,

    #[arg(
        long = "shutdown-wait",
        default_value_t = 5,
        help = "Seconds to wait for a launched server to exit before killing it"
    )]
    pub shutdown_wait: u64,

    #[arg(long, help = "Run a single case by name (e.g. get.root)")]
    pub case: Option<String>,

    #[arg(long, help = "List case names and exit")]
    pub list: bool,

    #[arg(long, default_value = "text", help = "Report format (text, json)")]
    pub format: String,

    #[arg(short = 'o', long, help = "Also write the report to this file")]
    pub output: Option<PathBuf>,

    #[arg(long = "log-level", default_value = "warn", global = true)]
    pub log_level: String,

    #[arg(long = "no-color", help = "Disable colored output", global = true)]
    pub no_color: bool,
}

impl Cli {
    pub fn to_config(&self) -> HarnessConfig {
        HarnessConfig::new(self.host.clone(), self.port)
            .with_second_port(self.second_port)
            .with_server_name(self.server_name.clone())
            .with_read_timeout(Duration::from_secs(self.timeout))
            .with_connect_timeout(Duration::from_secs(self.connect_timeout))
            .with_max_body_size(self.max_body_size)
            .with_server_body_limit(self.server_body_limit)
            .with_workers(self.workers)
            .with_ambiguous_framing_status(self.ambiguous_framing_status)
            .with_server_cmd(self.server_cmd.clone(), self.server_config.clone())
            .with_startup_grace(Duration::from_secs(self.startup_grace))
            .with_shutdown_wait(Duration::from_secs(self.shutdown_wait))
    }
}
