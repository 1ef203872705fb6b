// File: common/mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted raw-TCP fixture for wire-level tests. Unlike a real HTTP
//! server it will happily emit malformed bytes, which is the point.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub struct ScriptedServer {
    pub addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl ScriptedServer {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn abort(self) {
        self.handle.abort();
    }
}

async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture listener");
    let addr = listener.local_addr().expect("fixture local addr");
    (listener, addr)
}

async fn read_request_head(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    buf
}

/// Accept one connection, read the request head, write `response`, close.
pub async fn spawn_one(response: Vec<u8>) -> ScriptedServer {
    let (listener, addr) = bind().await;
    let handle = tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            read_request_head(&mut stream).await;
            let _ = stream.write_all(&response).await;
            let _ = stream.shutdown().await;
        }
    });
    ScriptedServer { addr, handle }
}

/// Accept one connection and never write a byte.
pub async fn spawn_silent() -> ScriptedServer {
    let (listener, addr) = bind().await;
    let handle = tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            read_request_head(&mut stream).await;
            // Hold the socket open until the client gives up.
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    });
    ScriptedServer { addr, handle }
}

/// Accept one connection and serve `responses` on it in order, one per
/// request head. Exercises keep-alive reuse: a client that reconnects
/// never sees the second response.
pub async fn spawn_sequence(responses: Vec<Vec<u8>>) -> ScriptedServer {
    let (listener, addr) = bind().await;
    let handle = tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            for response in responses {
                let head = read_request_head(&mut stream).await;
                if head.is_empty() {
                    break;
                }
                if stream.write_all(&response).await.is_err() {
                    break;
                }
            }
            let _ = stream.shutdown().await;
        }
    });
    ScriptedServer { addr, handle }
}

/// Accept one connection, collect everything the client sends until it
/// pauses, and mirror it back as a close-delimited 200 body.
pub async fn spawn_echo() -> ScriptedServer {
    let (listener, addr) = bind().await;
    let handle = tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut received = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                match tokio::time::timeout(Duration::from_millis(200), stream.read(&mut chunk))
                    .await
                {
                    Ok(Ok(n)) if n > 0 => received.extend_from_slice(&chunk[..n]),
                    _ => break,
                }
            }
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\n\r\n").await;
            let _ = stream.write_all(&received).await;
            let _ = stream.shutdown().await;
        }
    });
    ScriptedServer { addr, handle }
}

/// A port with nothing listening on it.
pub async fn unused_port() -> u16 {
    let (listener, addr) = bind().await;
    drop(listener);
    addr.port()
}
