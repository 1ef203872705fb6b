// File: connection.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::config::HarnessConfig;
use crate::wire::{decode_response, DecodeOptions, Outcome, RequestSpec, Response};
use log::{debug, trace, warn};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Per-exchange knobs. Keep-alive is opt-in: a case that wants to reuse the
/// connection for its next request says so here, otherwise the socket is
/// dropped after decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions {
    pub keep_alive: bool,
    pub head_response: bool,
}

impl SendOptions {
    pub fn keep_alive() -> Self {
        Self {
            keep_alive: true,
            head_response: false,
        }
    }
}

/// Owns one TCP connection to the target for the duration of a test case.
/// Transport failures never propagate as errors; they come back as the
/// outcome tag on the response.
pub struct Connection {
    config: Arc<HarnessConfig>,
    port: u16,
    stream: Option<TcpStream>,
}

impl Connection {
    pub fn new(config: Arc<HarnessConfig>) -> Self {
        let port = config.port();
        Self {
            config,
            port,
            stream: None,
        }
    }

    /// Connection to a non-default port of the same target.
    pub fn to_port(config: Arc<HarnessConfig>, port: u16) -> Self {
        Self {
            config,
            port,
            stream: None,
        }
    }

    pub async fn send(&mut self, spec: &RequestSpec) -> Response {
        self.send_with(spec, SendOptions::default()).await
    }

    pub async fn send_with(&mut self, spec: &RequestSpec, opts: SendOptions) -> Response {
        let mut stream = match self.take_or_connect().await {
            Ok(stream) => stream,
            Err(outcome) => return Response::aborted(outcome),
        };

        let bytes = spec.encode();
        trace!("sending {} request bytes to port {}", bytes.len(), self.port);
        if let Err(e) = stream.write_all(&bytes).await {
            warn!("write failed: {}", e);
            return Response::aborted(write_outcome(&e));
        }

        let mut decode_opts =
            DecodeOptions::new(self.config.read_timeout(), self.config.max_body_size());
        if opts.head_response {
            decode_opts = decode_opts.head();
        }
        let response = decode_response(&mut stream, decode_opts).await;

        if opts.keep_alive && response.outcome == Outcome::Completed {
            self.stream = Some(stream);
        }
        response
    }

    async fn take_or_connect(&mut self) -> Result<TcpStream, Outcome> {
        if let Some(stream) = self.stream.take() {
            debug!("reusing kept-alive connection to port {}", self.port);
            return Ok(stream);
        }
        let addr = format!("{}:{}", self.config.host(), self.port);
        match tokio::time::timeout(self.config.connect_timeout(), TcpStream::connect(&addr)).await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => {
                warn!("connect to {} failed: {}", addr, e);
                match e.kind() {
                    std::io::ErrorKind::ConnectionRefused => Err(Outcome::ConnectionRefused),
                    std::io::ErrorKind::TimedOut => Err(Outcome::TimedOut),
                    _ => Err(Outcome::ConnectionReset),
                }
            }
            Err(_) => {
                warn!("connect to {} timed out", addr);
                Err(Outcome::TimedOut)
            }
        }
    }
}

fn write_outcome(e: &std::io::Error) -> Outcome {
    match e.kind() {
        std::io::ErrorKind::ConnectionRefused => Outcome::ConnectionRefused,
        std::io::ErrorKind::TimedOut => Outcome::TimedOut,
        _ => Outcome::ConnectionReset,
    }
}

/// One-shot exchange: connect, send, decode, drop the socket.
pub async fn probe(config: &Arc<HarnessConfig>, spec: &RequestSpec) -> Response {
    Connection::new(Arc::clone(config)).send(spec).await
}
