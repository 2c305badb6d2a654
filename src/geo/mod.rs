//! Device position overrides and coordinate shifting.
//!
//! # Data Flow
//! ```text
//! userId
//!     → overrides.rs (lookup in the lazily parsed DevicePosition list)
//!     → apply_override: rewrite lat/lon in the query, yield CoordinateDelta
//!     ... origin call ...
//!     → reverse_shift: subtract the delta from every hotspot fragment
//! ```

pub mod overrides;
pub mod position;

pub use overrides::{apply_override, reverse_shift, DeviceOverrides, DevicePosition};
pub use position::CoordinateDelta;
