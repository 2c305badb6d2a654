//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Router, once a response is final:
//!     → hits.rs (statistics hits for count=1 requests)
//!
//! Consumers:
//!     → stdout (pretty or compact)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the trace span of every request
//! - Metrics are cheap (atomic increments)
//! - Hit recording sits behind a trait so tests can observe it

pub mod hits;
pub mod logging;
pub mod metrics;

pub use hits::{Hit, HitRecorder, MetricsHitRecorder};
