//! Fixed test positions for known devices.
//!
//! # Responsibilities
//! - Parse the `DevicePosition` setting (`device,lat,lon,device,lat,lon,...`)
//! - Substitute a device's fixed position into the outbound query
//! - Shift returned hotspots back by the substitution delta
//!
//! # Design Decisions
//! - The list is parsed lazily, once per process, then read-only
//! - An unknown device or an empty list is a miss, never an error

use std::sync::OnceLock;

use crate::document::fragment::{shift_field, PatchError};
use crate::geo::position::{to_micro, CoordinateDelta};
use crate::routing::query::Query;

const LAT_FIELD: &str = "\"lat\":";
const LON_FIELD: &str = "\"lon\":";

/// One configured device position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePosition {
    pub device_id: String,
    pub lat: String,
    pub lon: String,
}

/// Lazily parsed device position list shared by all requests.
#[derive(Debug, Default)]
pub struct DeviceOverrides {
    source: Option<String>,
    positions: OnceLock<Vec<DevicePosition>>,
}

impl DeviceOverrides {
    /// Create from the raw `DevicePosition` setting, if any.
    pub fn new(source: Option<String>) -> Self {
        Self {
            source,
            positions: OnceLock::new(),
        }
    }

    /// The parsed list; the first caller parses it.
    pub fn positions(&self) -> &[DevicePosition] {
        self.positions.get_or_init(|| {
            let parsed = self.source.as_deref().map(parse_positions).unwrap_or_default();
            tracing::debug!(count = parsed.len(), "Device positions loaded");
            parsed
        })
    }

    /// Fixed position configured for `device_id`.
    pub fn resolve(&self, device_id: &str) -> Option<&DevicePosition> {
        if device_id.trim().is_empty() {
            return None;
        }
        self.positions().iter().find(|p| p.device_id == device_id)
    }
}

fn parse_positions(value: &str) -> Vec<DevicePosition> {
    let items: Vec<&str> = value.split(',').map(str::trim).collect();
    items
        .chunks_exact(3)
        .map(|chunk| DevicePosition {
            device_id: chunk[0].to_string(),
            lat: chunk[1].to_string(),
            lon: chunk[2].to_string(),
        })
        .collect()
}

/// Micro-degree delta for one axis, zero when the original is unknown.
fn axis_delta(original: Option<&str>, replacement: &str) -> i64 {
    match original.map(to_micro) {
        Some(orig) if orig != 0 => to_micro(replacement).checked_sub(orig).unwrap_or(0),
        _ => 0,
    }
}

/// Put `lat`/`lon` into the query and report how far the position moved.
pub fn apply_override(query: &mut Query, lat: &str, lon: &str) -> CoordinateDelta {
    let delta = CoordinateDelta::new(
        axis_delta(query.get("lat"), lat),
        axis_delta(query.get("lon"), lon),
    );
    query.replace("lat", lat);
    query.replace("lon", lon);
    delta
}

/// Move a hotspot fragment's coordinates back by `delta`.
pub fn reverse_shift(fragment: &str, delta: CoordinateDelta) -> Result<String, PatchError> {
    if delta.is_identity() {
        return Ok(fragment.to_string());
    }
    let shifted = shift_field(fragment, LAT_FIELD, delta.lat.saturating_neg())?;
    shift_field(&shifted, LON_FIELD, delta.lon.saturating_neg())
}
