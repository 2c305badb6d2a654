//! Geofenced area lookup and area-scoped settings.
//!
//! # Responsibilities
//! - Map a query's lat/lon to the first configured `Area_<n>` containing it
//! - Resolve `<area>_<key>` → `<key>` → default for every setting
//!
//! # Design Decisions
//! - Areas are numbered densely from 1; the first gap ends the scan
//! - A malformed area is skipped, never fatal
//! - Bounds are inclusive on all four sides

use crate::config::Settings;
use crate::geo::position::to_micro;
use crate::routing::query::Query;

/// Highest area index that is ever consulted.
pub const AREA_LIMIT: usize = 1000;

/// Rectangular region in micro-degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaBounds {
    pub min_lat: i64,
    pub min_lon: i64,
    pub max_lat: i64,
    pub max_lon: i64,
}

impl AreaBounds {
    pub fn contains(&self, lat: i64, lon: i64) -> bool {
        lat >= self.min_lat && lon >= self.min_lon && lat <= self.max_lat && lon <= self.max_lon
    }
}

/// Parse `minLat,minLon,maxLat,maxLon`.
pub fn parse_bounds(value: &str) -> Option<AreaBounds> {
    let parts: Vec<i64> = value
        .split(',')
        .map(|p| p.trim().parse::<i64>().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        &[min_lat, min_lon, max_lat, max_lon] => Some(AreaBounds {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }),
        _ => None,
    }
}

/// Name of the first area containing the query's position.
pub fn resolve_area(settings: &Settings, query: &Query) -> Option<String> {
    let lat = query.get("lat").map(to_micro).unwrap_or(0);
    let lon = query.get("lon").map(to_micro).unwrap_or(0);

    for index in 1..=AREA_LIMIT {
        let key = format!("Area_{}", index);
        let Some(value) = settings.get(&key) else {
            tracing::trace!(area = %key, "No more areas configured");
            return None;
        };

        let Some(bounds) = parse_bounds(value) else {
            tracing::warn!(area = %key, value = %value, "Expecting four area bounds, skipping");
            continue;
        };

        if bounds.contains(lat, lon) {
            tracing::debug!(area = %key, lat, lon, "Position is inside area");
            return Some(key);
        }
    }
    None
}

/// Settings lookup scoped to one request's area.
#[derive(Debug, Clone)]
pub struct AreaSettings<'a> {
    settings: &'a Settings,
    area: Option<String>,
}

impl<'a> AreaSettings<'a> {
    pub fn new(settings: &'a Settings, area: Option<String>) -> Self {
        Self { settings, area }
    }

    pub fn area(&self) -> Option<&str> {
        self.area.as_deref()
    }

    /// `<area>_<key>`, then `<key>`, then `default`; blank means absent.
    pub fn resolve(&self, key: &str, default: &str) -> Option<String> {
        let scoped = self
            .area
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .and_then(|area| self.settings.get(&format!("{}_{}", area, key)));

        let value = scoped
            .or_else(|| self.settings.get(key))
            .unwrap_or(default);

        if value.trim().is_empty() {
            tracing::trace!(key, "No value configured");
            None
        } else {
            Some(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_parse_bounds() {
        assert_eq!(
            parse_bounds("1, 2,3 ,4"),
            Some(AreaBounds { min_lat: 1, min_lon: 2, max_lat: 3, max_lon: 4 })
        );
        assert_eq!(parse_bounds("1,2,3"), None);
        assert_eq!(parse_bounds("1,2,3,x"), None);
        assert_eq!(parse_bounds("1,2,3,4,5"), None);
    }

    #[test]
    fn test_point_inside_first_area() {
        let s = settings(&[("Area_1", "1000000,1000000,2000000,2000000")]);
        let inside = Query::parse("lat=1.5&lon=1.5");
        assert_eq!(resolve_area(&s, &inside).as_deref(), Some("Area_1"));

        let outside = Query::parse("lat=3.0&lon=1.5");
        assert_eq!(resolve_area(&s, &outside), None);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let s = settings(&[("Area_1", "1000000,1000000,2000000,2000000")]);
        let corner = Query::parse("lat=2.0&lon=1.0");
        assert_eq!(resolve_area(&s, &corner).as_deref(), Some("Area_1"));
    }

    #[test]
    fn test_first_match_wins_and_malformed_skipped() {
        let s = settings(&[
            ("Area_1", "broken"),
            ("Area_2", "0,0,5000000,5000000"),
            ("Area_3", "0,0,9000000,9000000"),
        ]);
        let q = Query::parse("lat=1.0&lon=1.0");
        assert_eq!(resolve_area(&s, &q).as_deref(), Some("Area_2"));
    }

    #[test]
    fn test_gap_ends_scan() {
        let s = settings(&[("Area_1", "0,0,1,1"), ("Area_3", "0,0,9000000,9000000")]);
        let q = Query::parse("lat=1.0&lon=1.0");
        assert_eq!(resolve_area(&s, &q), None);
    }

    #[test]
    fn test_missing_position_defaults_to_zero() {
        let s = settings(&[("Area_1", "-10,-10,10,10")]);
        assert_eq!(resolve_area(&s, &Query::default()).as_deref(), Some("Area_1"));
    }

    #[test]
    fn test_resolve_config_chain() {
        let s = settings(&[("Area_1_HostName", "area.example"), ("HostName", "global.example")]);
        let scoped = AreaSettings::new(&s, Some("Area_1".to_string()));
        assert_eq!(scoped.resolve("HostName", "default.example").as_deref(), Some("area.example"));

        let s = settings(&[("HostName", "global.example")]);
        let scoped = AreaSettings::new(&s, Some("Area_1".to_string()));
        assert_eq!(scoped.resolve("HostName", "default.example").as_deref(), Some("global.example"));

        let s = settings(&[("Area_1_HostName", " ")]);
        let scoped = AreaSettings::new(&s, Some("Area_1".to_string()));
        assert_eq!(scoped.resolve("HostName", "default.example").as_deref(), Some("default.example"));
    }

    #[test]
    fn test_resolve_config_blank_default() {
        let s = Settings::default();
        let global = AreaSettings::new(&s, None);
        assert_eq!(global.resolve("DefaultLayerName190310", ""), None);
    }
}
