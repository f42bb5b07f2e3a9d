//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use axum::http::StatusCode;
use fetch_relay::codec::{self, Frame};
use fetch_relay::config::RelayConfig;
use fetch_relay::{HttpServer, Shutdown};

/// Canned reply of a mock upstream.
pub struct MockReply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
    /// Send the body with chunked transfer coding and no `Content-Length`.
    pub chunked: bool,
}

impl MockReply {
    pub fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", content_type.to_string())],
            body: body.into(),
            chunked: false,
        }
    }

    pub fn chunked(mut self) -> Self {
        self.chunked = true;
        self
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }
}

/// Start an upstream that answers every request with `f(request head)`.
/// The head is lower-cased to make header lookups simple.
pub async fn start_programmable_backend<F>(f: F) -> SocketAddr
where
    F: Fn(&str) -> MockReply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&head).to_lowercase();
                let reply = f(&head);

                let reason = StatusCode::from_u16(reply.status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("OK");
                let mut response = format!("HTTP/1.1 {} {}\r\n", reply.status, reason);
                for (name, value) in &reply.headers {
                    response.push_str(&format!("{name}: {value}\r\n"));
                }
                if reply.chunked {
                    response.push_str("Transfer-Encoding: chunked\r\nConnection: close\r\n\r\n");
                } else {
                    response.push_str(&format!(
                        "Content-Length: {}\r\nConnection: close\r\n\r\n",
                        reply.body.len()
                    ));
                }

                let _ = socket.write_all(response.as_bytes()).await;
                if reply.chunked {
                    for chunk in reply.body.chunks(1000) {
                        let _ = socket.write_all(format!("{:x}\r\n", chunk.len()).as_bytes()).await;
                        let _ = socket.write_all(chunk).await;
                        let _ = socket.write_all(b"\r\n").await;
                    }
                    let _ = socket.write_all(b"0\r\n\r\n").await;
                } else {
                    let _ = socket.write_all(&reply.body).await;
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Relay config suited to tests: fast retries, short deadlines.
pub fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.fetch.base_deadline_secs = 5;
    config.fetch.retry_delay_ms = 10;
    config.fetch.unknown_error_delay_ms = 10;
    config
}

/// Run a relay server; returns its address and the shutdown handle.
pub async fn start_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let listener = tokio::net::TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// Outer envelope and decoded frame of one relay call.
pub struct RelayReply {
    pub outer_status: u16,
    pub outer_content_type: String,
    pub frame: Frame,
}

impl RelayReply {
    pub fn header(&self, name: &str) -> Option<String> {
        codec::decode(&self.frame.header)
            .remove(name)
            .map(|v| String::from_utf8(v).unwrap())
    }
}

/// POST an encoded relay call.
pub async fn relay_call(relay: SocketAddr, fields: &[(&str, &str)]) -> RelayReply {
    let body = codec::deflate(&codec::encode(fields.iter().copied())).unwrap();
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .post(format!("http://{relay}/fetch.py"))
        .body(body)
        .send()
        .await
        .expect("Relay unreachable");

    let outer_status = res.status().as_u16();
    let outer_content_type = res
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = res.bytes().await.unwrap();

    RelayReply {
        outer_status,
        outer_content_type,
        frame: codec::parse_frame(&bytes).unwrap(),
    }
}
