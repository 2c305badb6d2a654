//! Client identification: app family, operating system and build.

use crate::config::{ClientConfig, OsThreshold};
use crate::routing::query::Query;

/// App families with their own directory behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientFamily {
    Generic,
    /// Image-trigger app; old builds skip the directory.
    ImageTrigger,
    /// Slam app; always served its default layer.
    Slam,
}

impl ClientFamily {
    /// Family of the `client` query value.
    pub fn lookup(clients: &ClientConfig, client: Option<&str>) -> Self {
        match client {
            Some(name) if name == clients.image_trigger_client => ClientFamily::ImageTrigger,
            Some(name) if name == clients.slam_client => ClientFamily::Slam,
            _ => ClientFamily::Generic,
        }
    }

    /// Settings key prefix for family specific default layers.
    pub fn settings_prefix<'a>(&self, clients: &'a ClientConfig) -> Option<&'a str> {
        match self {
            ClientFamily::Generic => None,
            ClientFamily::ImageTrigger => Some(&clients.image_trigger_client),
            ClientFamily::Slam => Some(&clients.slam_client),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientFamily::Generic => "generic",
            ClientFamily::ImageTrigger => "image_trigger",
            ClientFamily::Slam => "slam",
        }
    }
}

/// Operating system and numeric build of the requesting app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProfile {
    pub os: Option<String>,
    pub bundle: u64,
}

impl ClientProfile {
    pub fn from_query(query: &Query) -> Self {
        Self {
            os: query.non_blank("os").map(str::to_string),
            bundle: query.get("bundle").map(leading_integer).unwrap_or(0),
        }
    }

    /// Whether the build reaches `threshold` for this OS.
    ///
    /// OS names match exactly; other systems never qualify.
    pub fn meets(&self, threshold: &OsThreshold) -> bool {
        match self.os.as_deref() {
            Some("Android") => self.bundle >= threshold.android,
            Some("iOS") => self.bundle >= threshold.ios,
            _ => false,
        }
    }
}

/// Leading decimal digits of `value`, or 0 when it does not start with one.
fn leading_integer(value: &str) -> u64 {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEWER: OsThreshold = OsThreshold { android: 190310, ios: 20190310 };

    #[test]
    fn test_family_lookup() {
        let clients = ClientConfig::default();
        assert_eq!(ClientFamily::lookup(&clients, Some("Arvos")), ClientFamily::ImageTrigger);
        assert_eq!(ClientFamily::lookup(&clients, Some("Arslam")), ClientFamily::Slam);
        assert_eq!(ClientFamily::lookup(&clients, Some("arvos")), ClientFamily::Generic);
        assert_eq!(ClientFamily::lookup(&clients, None), ClientFamily::Generic);
        assert_eq!(ClientFamily::Slam.settings_prefix(&clients), Some("Arslam"));
    }

    #[test]
    fn test_profile_thresholds() {
        let android = ClientProfile::from_query(&Query::parse("os=Android&bundle=190310"));
        assert!(android.meets(&NEWER));

        let old_ios = ClientProfile::from_query(&Query::parse("os=iOS&bundle=20190309"));
        assert!(!old_ios.meets(&NEWER));

        let lowercase = ClientProfile::from_query(&Query::parse("os=android&bundle=999999"));
        assert!(!lowercase.meets(&NEWER));
    }

    #[test]
    fn test_bundle_parsing() {
        assert_eq!(ClientProfile::from_query(&Query::parse("bundle=190310b")).bundle, 190310);
        assert_eq!(ClientProfile::from_query(&Query::parse("bundle=v2")).bundle, 0);
        assert_eq!(ClientProfile::from_query(&Query::parse("")).bundle, 0);
    }
}
