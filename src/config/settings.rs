//! Flat key-value settings lookup.

use std::collections::{BTreeMap, HashMap};

use crate::config::schema::SettingValue;

/// Read-only view of the `[settings]` table with values as strings.
///
/// Blank values are treated as absent everywhere.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn from_config(table: &BTreeMap<String, SettingValue>) -> Self {
        let values = table
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();
        Self { values }
    }

    /// Value for `key` unless missing or blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for Settings
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_absent() {
        let settings: Settings = [("HostName", "  "), ("Port", "80")].into_iter().collect();
        assert_eq!(settings.get("HostName"), None);
        assert_eq!(settings.get("Port"), Some("80"));
        assert_eq!(settings.get("Missing"), None);
    }

    #[test]
    fn test_from_config() {
        let mut table = BTreeMap::new();
        table.insert("Port".to_string(), SettingValue::Integer(81));
        let settings = Settings::from_config(&table);
        assert_eq!(settings.get("Port"), Some("81"));
    }
}
