//! Statistics hits.
//!
//! # Responsibilities
//! - Describe one counted request (`Hit`)
//! - Derive the version, location and layer keys from it
//! - Hand hits to a pluggable `HitRecorder`
//!
//! # Design Decisions
//! - Keys never contain `..`; such values are replaced by `Unknown*` markers
//! - The default recorder only emits metrics and a log event

use crate::geo::position::truncate_fraction;
use crate::observability::metrics;

/// One request worth counting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hit {
    pub os: Option<String>,
    pub bundle: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub layer_name: Option<String>,
    /// The client was redirected to a layer.
    pub redirected: bool,
    /// A layer was fetched and served.
    pub served: bool,
}

fn sanitize<'a>(value: Option<&'a str>, unknown: &'a str) -> &'a str {
    match value {
        Some(v) if !v.is_empty() && !v.contains("..") => v,
        _ => unknown,
    }
}

impl Hit {
    /// `<os>_<bundle>`.
    pub fn version_key(&self) -> String {
        format!(
            "{}_{}",
            sanitize(self.os.as_deref(), "UnknownOperatingSystem"),
            sanitize(self.bundle.as_deref(), "UnknownBundle"),
        )
    }

    /// `<lon>_<lat>-<layer>`, coordinates cut to three decimals.
    pub fn location_key(&self) -> String {
        let lat = truncate_fraction(sanitize(self.lat.as_deref(), "UnknownLat"));
        let lon = truncate_fraction(sanitize(self.lon.as_deref(), "UnknownLon"));
        format!("{}_{}-{}", lon, lat, self.layer_key())
    }

    pub fn layer_key(&self) -> &str {
        sanitize(self.layer_name.as_deref(), "UnknownLayer")
    }
}

/// Sink for statistics hits.
pub trait HitRecorder: Send + Sync {
    fn record(&self, hit: &Hit);
}

/// Records hits as `relay_hits_total` counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsHitRecorder;

impl HitRecorder for MetricsHitRecorder {
    fn record(&self, hit: &Hit) {
        let version = hit.version_key();
        let location = hit.location_key();
        metrics::record_hit("version", &version);
        metrics::record_hit("location", &location);

        let has_layer = hit.layer_name.as_deref().is_some_and(|l| !l.is_empty());
        if hit.redirected && has_layer {
            metrics::record_hit("layer", hit.layer_key());
        }
        if hit.served && has_layer {
            metrics::record_hit("layer_served", hit.layer_key());
        }

        tracing::info!(
            version = %version,
            location = %location,
            redirected = hit.redirected,
            served = hit.served,
            "Statistics hit"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit() -> Hit {
        Hit {
            os: Some("Android".into()),
            bundle: Some("190310".into()),
            lat: Some("48.1234567".into()),
            lon: Some("11.5".into()),
            layer_name: Some("Reign-of-Gold".into()),
            redirected: true,
            served: false,
        }
    }

    #[test]
    fn test_keys() {
        let hit = hit();
        assert_eq!(hit.version_key(), "Android_190310");
        assert_eq!(hit.location_key(), "11.5_48.123-Reign-of-Gold");
        assert_eq!(hit.layer_key(), "Reign-of-Gold");
    }

    #[test]
    fn test_unknown_values() {
        let hit = Hit {
            os: Some("../etc".into()),
            bundle: Some(String::new()),
            ..Hit::default()
        };
        assert_eq!(hit.version_key(), "UnknownOperatingSystem_UnknownBundle");
        assert_eq!(hit.location_key(), "UnknownLon_UnknownLat-UnknownLayer");
    }

    #[test]
    fn test_metrics_recorder_without_exporter() {
        MetricsHitRecorder.record(&hit());
        MetricsHitRecorder.record(&Hit::default());
    }
}
