// File: config.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

/// Immutable harness configuration, constructed once at startup and shared
/// by reference with every component. No component mutates it after the run
/// has started.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    host: String,
    port: u16,
    second_port: Option<u16>,
    server_name: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    max_body_size: usize,
    server_body_limit: usize,
    workers: usize,
    ambiguous_framing_status: u16,
    server_cmd: Option<String>,
    server_config: Option<String>,
    startup_grace: Duration,
    shutdown_wait: Duration,
}

impl HarnessConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            second_port: None,
            server_name: "localhost".to_string(),
            connect_timeout: Duration::from_millis(3000),
            read_timeout: Duration::from_millis(8000),
            max_body_size: 1 << 20,
            server_body_limit: 1024,
            workers: 10,
            ambiguous_framing_status: 400,
            server_cmd: None,
            server_config: None,
            startup_grace: Duration::from_secs(3),
            shutdown_wait: Duration::from_secs(5),
        }
    }

    pub fn with_second_port(mut self, port: Option<u16>) -> Self {
        self.second_port = port;
        self
    }

    pub fn with_server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = server_name.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    pub fn with_server_body_limit(mut self, limit: usize) -> Self {
        self.server_body_limit = limit;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_ambiguous_framing_status(mut self, status: u16) -> Self {
        self.ambiguous_framing_status = status;
        self
    }

    pub fn with_server_cmd(mut self, cmd: Option<String>, config_path: Option<String>) -> Self {
        self.server_cmd = cmd;
        self.server_config = config_path;
        self
    }

    pub fn with_startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }

    pub fn with_shutdown_wait(mut self, wait: Duration) -> Self {
        self.shutdown_wait = wait;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Additional listen port of the same deployment, when it serves more
    /// than one.
    pub fn second_port(&self) -> Option<u16> {
        self.second_port
    }

    /// Value the suite sends in `Host` headers.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Hard ceiling for any body the decoder is willing to accumulate. A
    /// Content-Length above this is a parse error, not a clamp.
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// The body-size limit the server under test is deployed with. Requests
    /// one byte above it must draw a 413.
    pub fn server_body_limit(&self) -> usize {
        self.server_body_limit
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Status the server under test is expected to answer when a request
    /// carries both Content-Length and Transfer-Encoding: chunked. RFC 7230
    /// allows a server to either reject or honor chunked framing, so the
    /// expected code is deployment policy, not harness policy.
    pub fn ambiguous_framing_status(&self) -> u16 {
        self.ambiguous_framing_status
    }

    pub fn server_cmd(&self) -> Option<&str> {
        self.server_cmd.as_deref()
    }

    pub fn server_config(&self) -> Option<&str> {
        self.server_config.as_deref()
    }

    pub fn startup_grace(&self) -> Duration {
        self.startup_grace
    }

    pub fn shutdown_wait(&self) -> Duration {
        self.shutdown_wait
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 8080)
    }
}
