//! Single-use HTTP/1.0 exchanges with the origin.
//!
//! # Responsibilities
//! - Connect, send one GET, read until the origin closes the connection
//! - Bound every read with a deadline
//! - Re-issue the whole exchange once when nothing could be read
//!
//! # Design Decisions
//! - No pooling: one connection per exchange
//! - A partially read response is discarded, never returned
//! - Connect and send failures are not retried

use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::config::TransportConfig;
use crate::net::response::{split, HttpExchange};
use crate::net::TransportError;
use crate::observability::metrics;

const READ_CHUNK: usize = 64 * 1024;

/// How a single attempt ended.
enum ReadOutcome {
    /// The origin closed after sending a response.
    Complete(Vec<u8>),
    /// The origin closed without sending anything.
    Empty,
    /// A read deadline elapsed; whatever arrived is dropped.
    TimedOut { discarded: usize },
}

/// Origin transport.
#[derive(Debug, Clone)]
pub struct Transport {
    connect_timeout: Duration,
    read_timeout: Duration,
    attempts: u32,
}

impl Transport {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            read_timeout: Duration::from_secs(config.read_timeout_secs),
            attempts: config.attempts.max(1),
        }
    }

    /// Override the read deadline.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Perform one GET of `path` on `host:port`.
    pub async fn exchange(
        &self,
        host: &str,
        port: u16,
        path: &str,
        user_agent: &str,
    ) -> Result<HttpExchange, TransportError> {
        let request = format!(
            "GET {} HTTP/1.0\r\nUser-Agent: {}\r\nHost: {}\r\n\r\n",
            path, user_agent, host
        );
        let start_time = Instant::now();

        for attempt in 1..=self.attempts {
            tracing::debug!(host, port, path, attempt, "Origin request");

            match self.attempt(host, port, request.as_bytes()).await {
                Ok(ReadOutcome::Complete(raw)) => {
                    metrics::record_exchange("complete", start_time);
                    let raw = String::from_utf8(raw).map_err(|_| {
                        TransportError::Malformed("response is not valid UTF-8".to_string())
                    })?;
                    tracing::trace!(response = %raw, "Origin response");
                    return split(&raw);
                }
                Ok(ReadOutcome::Empty) => {
                    tracing::warn!(host, port, attempt, "Origin closed without responding");
                }
                Ok(ReadOutcome::TimedOut { discarded }) => {
                    tracing::warn!(host, port, attempt, discarded, "Origin read deadline elapsed");
                }
                Err(e) => {
                    metrics::record_exchange("error", start_time);
                    return Err(e);
                }
            }
        }

        metrics::record_exchange("unavailable", start_time);
        Err(TransportError::UpstreamUnavailable {
            host: host.to_string(),
            port,
            attempts: self.attempts,
        })
    }

    async fn attempt(&self, host: &str, port: u16, request: &[u8]) -> Result<ReadOutcome, TransportError> {
        let connect = TcpStream::connect((host, port));
        let mut stream = match timeout(self.connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(TransportError::Connect {
                    host: host.to_string(),
                    port,
                    source,
                })
            }
            Err(_) => {
                return Err(TransportError::ConnectTimeout {
                    host: host.to_string(),
                    port,
                })
            }
        };

        stream
            .write_all(request)
            .await
            .map_err(TransportError::Send)?;

        let mut response = Vec::new();
        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            match timeout(self.read_timeout, stream.read(&mut chunk)).await {
                Err(_) => {
                    return Ok(ReadOutcome::TimedOut {
                        discarded: response.len(),
                    })
                }
                Ok(Err(e)) => return Err(TransportError::Receive(e)),
                Ok(Ok(0)) if response.is_empty() => return Ok(ReadOutcome::Empty),
                Ok(Ok(0)) => return Ok(ReadOutcome::Complete(response)),
                Ok(Ok(n)) => response.extend_from_slice(&chunk[..n]),
            }
        }
    }
}

/// User agent for directory lookups made on behalf of a user.
pub fn directory_agent(user_id: &str) -> String {
    format!("HotspotClient {}", user_id)
}

/// User agent for default-layer fetches.
pub fn relay_agent() -> String {
    format!("HotspotRelay/{}", env!("CARGO_PKG_VERSION"))
}

/// User agent for direct layer fetches.
pub fn layer_agent() -> String {
    format!("HotspotRelay-Layer/{}", env!("CARGO_PKG_VERSION"))
}
