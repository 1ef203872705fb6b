// File: server.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

use log::{info, warn};
use std::process::Stdio;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const POLL_CONNECT_TIMEOUT: Duration = Duration::from_millis(250);

/// The server under test, launched and torn down by the harness. Entirely
/// optional: when the target is already running, none of this is used.
pub struct ServerUnderTest {
    child: Child,
    cmd: String,
}

impl ServerUnderTest {
    /// Spawn `cmd` (with an optional configuration-file argument) and wait
    /// up to `grace` for it to accept connections on `host:port`.
    pub async fn start(
        cmd: &str,
        config_path: Option<&str>,
        host: &str,
        port: u16,
        grace: Duration,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut command = Command::new(cmd);
        if let Some(path) = config_path {
            command.arg(path);
        }
        command.stdout(Stdio::null()).stderr(Stdio::null());
        let mut child = command
            .spawn()
            .map_err(|e| format!("failed to spawn {}: {}", cmd, e))?;
        info!("spawned server under test: {}", cmd);

        let addr = format!("{}:{}", host, port);
        let deadline = Instant::now() + grace;
        loop {
            if let Some(status) = child.try_wait()? {
                return Err(format!("server exited during startup: {}", status).into());
            }
            match timeout(POLL_CONNECT_TIMEOUT, TcpStream::connect(&addr)).await {
                Ok(Ok(_)) => {
                    info!("server is listening on {}", addr);
                    return Ok(Self {
                        child,
                        cmd: cmd.to_string(),
                    });
                }
                _ => {
                    if Instant::now() >= deadline {
                        let _ = child.kill().await;
                        return Err(format!(
                            "server not listening on {} within {:?}",
                            addr, grace
                        )
                        .into());
                    }
                    sleep(POLL_INTERVAL).await;
                }
            }
        }
    }

    /// Best-effort teardown: ask politely, wait a bounded period, then
    /// force-kill.
    pub async fn stop(mut self, wait: Duration) {
        info!("stopping server under test: {}", self.cmd);
        self.terminate();
        match timeout(wait, self.child.wait()).await {
            Ok(Ok(status)) => info!("server exited: {}", status),
            Ok(Err(e)) => warn!("wait on server failed: {}", e),
            Err(_) => {
                warn!("server did not exit within {:?}, killing", wait);
                if let Err(e) = self.child.kill().await {
                    warn!("kill failed: {}", e);
                }
            }
        }
    }

    #[cfg(unix)]
    fn terminate(&mut self) {
        if let Some(pid) = self.child.id() {
            unsafe {
                libc::kill(pid as libc::pid_t, libc::SIGTERM);
            }
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) {
        let _ = self.child.start_kill();
    }
}
