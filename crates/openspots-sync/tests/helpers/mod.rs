//! Shared test helpers for integration tests: a stand-in venue server.

use std::sync::Arc;

use futures::SinkExt;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use openspots_core::config::server::ServerConfig;
use openspots_core::config::sync::SyncConfig;
use openspots_sync::{DashboardSession, HttpActionTransport};

/// Answers each HTTP request with the next canned JSON body.
pub struct TestVenue {
    pub base_url: String,
    pub handle: JoinHandle<Vec<String>>,
}

impl TestVenue {
    /// Serve `responses` in order, one connection each, and return the request lines.
    pub async fn http(responses: Vec<Value>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut request_lines = Vec::new();
            for body in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                while !String::from_utf8_lossy(&raw).contains("\r\n\r\n{}") {
                    let n = stream.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    raw.extend_from_slice(&buf[..n]);
                }
                let text = String::from_utf8_lossy(&raw).to_string();
                request_lines.push(text.lines().next().unwrap_or_default().to_string());

                let body = body.to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
            }
            request_lines
        });
        Self { base_url, handle }
    }
}

/// Accept one WebSocket client, send `frames`, then close.
pub async fn push_feed(frames: Vec<String>) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws/notifications/1/", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for frame in frames {
            ws.send(Message::text(frame)).await.unwrap();
        }
        ws.close(None).await.unwrap();
    });
    (url, handle)
}

/// Session posting to `base_url` with the default sync settings.
pub fn session(base_url: &str) -> DashboardSession {
    let transport = HttpActionTransport::new(ServerConfig {
        base_url: base_url.to_string(),
        csrf_token: "test-token".into(),
        request_timeout_seconds: 5,
        ..Default::default()
    })
    .unwrap();
    DashboardSession::new(&SyncConfig::default(), Arc::new(transport))
}
