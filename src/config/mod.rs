//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → settings.rs (flat key-value view used by area lookups)
//!     → shared via Arc<RelayContext> with every request
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod settings;
pub mod validation;

pub use schema::{
    ClientConfig, ListenerConfig, ObservabilityConfig, OsThreshold, RelayConfig, SettingValue,
    ThresholdConfig, TransportConfig,
};
pub use settings::Settings;
