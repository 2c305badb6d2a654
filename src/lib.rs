//! Hotspot relay library.

// Core subsystems
pub mod config;
pub mod document;
pub mod geo;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RelayContext, RelayError, RelayResponse, Router};
