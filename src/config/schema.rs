//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Inbound request timeouts.
    pub timeouts: TimeoutConfig,

    /// Outbound origin transport settings.
    pub transport: TransportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Client identities that get special routing.
    pub clients: ClientConfig,

    /// App build thresholds per operating system.
    pub thresholds: ThresholdConfig,

    /// Flat key-value settings (`HostName`, `Area_1`, `Area_1_Port` ...).
    pub settings: BTreeMap<String, SettingValue>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// End-to-end budget for one inbound request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Origin transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Deadline for each socket read in seconds.
    pub read_timeout_secs: u64,

    /// Total attempts when an exchange reads nothing (1 = no retry).
    pub attempts: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            read_timeout_secs: 16,
            attempts: 2,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "compact").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Client names and layer names that drive the directory logic.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Layer name that marks a directory request.
    pub directory_layer: String,

    /// `client` value of the image-trigger app family.
    pub image_trigger_client: String,

    /// Directory layer queried on behalf of newer image-trigger clients.
    pub image_trigger_directory_layer: String,

    /// `client` value of the slam app family.
    pub slam_client: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            directory_layer: "Arpoise-Directory".to_string(),
            image_trigger_client: "Arvos".to_string(),
            image_trigger_directory_layer: "AR-vos-Directory".to_string(),
            slam_client: "Arslam".to_string(),
        }
    }
}

/// Minimum app build per operating system.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct OsThreshold {
    pub android: u64,
    pub ios: u64,
}

/// Build thresholds that switch routing behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Image-trigger clients below this build get their default layer directly.
    pub image_trigger_directory: OsThreshold,

    /// Clients at or above this build get `DefaultLayerName190310`.
    pub newer_default_layer: OsThreshold,

    /// Clients at or above this build can show a multi-hotspot directory.
    pub multi_hotspot: OsThreshold,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            image_trigger_directory: OsThreshold { android: 200101, ios: 0 },
            newer_default_layer: OsThreshold { android: 190310, ios: 20190310 },
            multi_hotspot: OsThreshold { android: 190208, ios: 20190208 },
        }
    }
}

/// A settings value; TOML scalars of any type are accepted.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SettingValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Text(s) => f.write_str(s),
            SettingValue::Integer(i) => write!(f, "{}", i),
            SettingValue::Float(v) => write!(f, "{}", v),
            SettingValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}
