//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use hotspot_relay::config::{RelayConfig, SettingValue};
use hotspot_relay::observability::{Hit, HitRecorder};
use hotspot_relay::{RelayContext, Router};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One request as seen by the mock origin.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub user_agent: String,
}

impl RecordedRequest {
    /// Path without the query string.
    pub fn uri(&self) -> &str {
        self.path.split('?').next().unwrap_or_default()
    }

    /// Decoded query parameter.
    pub fn param(&self, name: &str) -> Option<String> {
        let (_, query) = self.path.split_once('?')?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

/// A mock origin that records requests and answers through a closure.
pub struct MockOrigin {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockOrigin {
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a mock origin; `respond` returns the complete raw HTTP response.
pub async fn start_origin<F>(respond: F) -> MockOrigin
where
    F: Fn(&RecordedRequest) -> String + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { break };
            let recorded = recorded.clone();
            let respond = respond.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let text = String::from_utf8_lossy(&buf).into_owned();
                let request = parse_request(&text);
                recorded.lock().unwrap().push(request.clone());

                let response = respond(&request);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockOrigin { addr, requests }
}

fn parse_request(text: &str) -> RecordedRequest {
    let mut lines = text.lines();
    let path = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    let user_agent = lines
        .find_map(|l| l.strip_prefix("User-Agent: "))
        .unwrap_or_default()
        .to_string();
    RecordedRequest { path, user_agent }
}

/// A 200 response carrying `body`.
pub fn ok(body: &str) -> String {
    format!("HTTP/1.0 200 OK\r\nContent-Type: application/json\r\n\r\n{}", body)
}

/// A 200 response carrying `body` and a session cookie.
pub fn ok_with_cookie(body: &str, cookie: &str) -> String {
    format!(
        "HTTP/1.0 200 OK\r\nSet-Cookie: {}\r\nContent-Type: application/json\r\n\r\n{}",
        cookie, body
    )
}

/// Relay configuration pointing at `port` on localhost.
pub fn config_for(port: u16, settings: &[(&str, &str)]) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.transport.read_timeout_secs = 2;
    config
        .settings
        .insert("HostName".to_string(), SettingValue::Text("127.0.0.1".to_string()));
    config
        .settings
        .insert("Port".to_string(), SettingValue::Integer(port as i64));
    for (key, value) in settings {
        config
            .settings
            .insert(key.to_string(), SettingValue::Text(value.to_string()));
    }
    config
}

/// Collects statistics hits.
#[derive(Default)]
pub struct RecordingHits {
    hits: Mutex<Vec<Hit>>,
}

impl RecordingHits {
    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }
}

impl HitRecorder for RecordingHits {
    fn record(&self, hit: &Hit) {
        self.hits.lock().unwrap().push(hit.clone());
    }
}

/// A router over `config` whose hits land in the returned recorder.
pub fn router_with_hits(config: &RelayConfig) -> (Router, Arc<RecordingHits>) {
    let hits = Arc::new(RecordingHits::default());
    let context = RelayContext::new(config).with_hit_recorder(hits.clone());
    (Router::new(Arc::new(context)), hits)
}
