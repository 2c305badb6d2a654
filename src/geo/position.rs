//! Micro-degree conversion and coordinate deltas.

use std::ops::{Add, AddAssign};

/// Largest magnitude a coordinate can take, in micro-degrees.
pub const MAX_MICRO: i64 = 180_000_000;

/// Degrees as sent by clients (`"48.158"`) to truncated micro-degrees.
///
/// Unparseable, absent or non-finite values count as zero; everything else
/// is clamped to ±180°.
pub fn to_micro(value: &str) -> i64 {
    let degrees: f64 = value.trim().parse().unwrap_or(0.0);
    if !degrees.is_finite() {
        return 0;
    }
    ((degrees * 1_000_000.0) as i64).clamp(-MAX_MICRO, MAX_MICRO)
}

/// Keep at most three digits after the decimal point.
pub fn truncate_fraction(value: &str) -> &str {
    match value.find('.') {
        Some(dot) if value.len() > dot + 4 => &value[..dot + 4],
        _ => value,
    }
}

/// Signed shift between a substituted and a true position, in micro-degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinateDelta {
    pub lat: i64,
    pub lon: i64,
}

impl CoordinateDelta {
    pub const IDENTITY: Self = Self { lat: 0, lon: 0 };

    pub fn new(lat: i64, lon: i64) -> Self {
        Self { lat, lon }
    }

    pub fn is_identity(&self) -> bool {
        self.lat == 0 && self.lon == 0
    }
}

impl Add for CoordinateDelta {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            lat: self.lat.saturating_add(other.lat),
            lon: self.lon.saturating_add(other.lon),
        }
    }
}

impl AddAssign for CoordinateDelta {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::fmt::Display for CoordinateDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_micro_truncates() {
        assert_eq!(to_micro("1.5"), 1_500_000);
        assert_eq!(to_micro("48.1234567"), 48_123_456);
        assert_eq!(to_micro("-11.0000009"), -11_000_000);
        assert_eq!(to_micro("garbage"), 0);
        assert_eq!(to_micro(""), 0);
    }

    #[test]
    fn test_to_micro_clamps_extremes() {
        assert_eq!(to_micro("-1e19"), -MAX_MICRO);
        assert_eq!(to_micro("1e300"), MAX_MICRO);
        assert_eq!(to_micro("200.5"), MAX_MICRO);
        assert_eq!(to_micro("inf"), 0);
        assert_eq!(to_micro("NaN"), 0);
    }

    #[test]
    fn test_truncate_fraction() {
        assert_eq!(truncate_fraction("48.158123"), "48.158");
        assert_eq!(truncate_fraction("48.15"), "48.15");
        assert_eq!(truncate_fraction("48"), "48");
    }

    #[test]
    fn test_delta_accumulates() {
        let mut d = CoordinateDelta::new(10, -5);
        d += CoordinateDelta::new(-10, 5);
        assert!(d.is_identity());
        assert_eq!(CoordinateDelta::IDENTITY, CoordinateDelta::default());
    }

    #[test]
    fn test_delta_add_saturates() {
        let d = CoordinateDelta::new(i64::MAX, i64::MIN) + CoordinateDelta::new(1, -1);
        assert_eq!(d, CoordinateDelta::new(i64::MAX, i64::MIN));
    }
}
