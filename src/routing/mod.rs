//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound query string
//!     → query.rs (ordered name/value pairs)
//!     → router.rs (device override, area, origin address)
//!     → client.rs (app family, OS and build thresholds)
//!     → area.rs (area → global → default settings)
//!     → RoutingDecision
//!         PassThrough | DefaultLayer | Redirect | LayerRequest
//!     → RelayResponse (cookie, rewritten body)
//! ```
//!
//! # Design Decisions
//! - Stateless per request; the only shared state is the read-only context
//! - Client families are a closed set selected by lookup
//! - Deterministic: same query and origin replies give the same response

use thiserror::Error;

use crate::document::PatchError;
use crate::net::TransportError;

pub mod area;
pub mod client;
pub mod query;
pub mod router;

pub use router::{RelayContext, RelayResponse, Router, RoutingDecision};

/// Errors that end a request without a response document.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The origin could not be reached or answered badly.
    #[error("origin exchange failed: {0}")]
    Transport(#[from] TransportError),

    /// The origin document could not be taken apart.
    #[error("origin document malformed: {0}")]
    Document(#[from] PatchError),

    /// Required settings are missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}
