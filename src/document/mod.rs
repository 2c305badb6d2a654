//! Partial JSON handling for origin responses.
//!
//! # Data Flow
//! ```text
//! response body
//!     → hotspots.rs (marker check, split array into object fragments)
//!     → fragment.rs (delimiter matching, field scans and patches)
//!     → hotspots.rs (reassemble marker + [fragments] + rest)
//! ```
//!
//! # Design Decisions
//! - No document model: fields the relay does not touch stay byte-for-byte
//! - Structural problems are errors, never silently repaired

pub mod fragment;
pub mod hotspots;

pub use fragment::PatchError;
pub use hotspots::HotspotDocument;
