//! Outbound networking to the origin.
//!
//! # Data Flow
//! ```text
//! host, port, path, user agent
//!     → transport.rs (connect, send GET, read with deadline, retry once)
//!     → response.rs (status check, cookie capture, header/body split)
//!     → HttpExchange
//! ```
//!
//! # Design Decisions
//! - Every failure here is fatal for the request; the caller decides how to
//!   report it
//! - Only "read nothing at all" is retried, and only once by default

use thiserror::Error;

pub mod response;
pub mod transport;

pub use response::HttpExchange;
pub use transport::Transport;

/// Errors raised while talking to the origin.
#[derive(Debug, Error)]
pub enum TransportError {
    /// TCP connect failed.
    #[error("connect to {host}:{port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// TCP connect did not finish in time.
    #[error("connect to {host}:{port} timed out")]
    ConnectTimeout { host: String, port: u16 },

    /// Writing the request failed.
    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),

    /// Reading the response failed.
    #[error("receive failed: {0}")]
    Receive(#[source] std::io::Error),

    /// Every attempt ended without a response.
    #[error("{host}:{port} sent no response after {attempts} attempts")]
    UpstreamUnavailable { host: String, port: u16, attempts: u32 },

    /// The origin answered with something other than 200.
    #[error("bad HTTP response: {0}")]
    BadStatus(String),

    /// The response could not be framed.
    #[error("illegal HTTP response: {0}")]
    Malformed(String),
}
