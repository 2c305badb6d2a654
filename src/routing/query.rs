//! Ordered query parameters of one inbound request.

use url::form_urlencoded;

/// One `name=value` segment: the bytes as received plus their decoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Param {
    raw: String,
    name: String,
    value: String,
}

impl Param {
    fn parse(segment: &str) -> Self {
        let (name, value) = form_urlencoded::parse(segment.as_bytes())
            .next()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .unwrap_or_default();
        Self {
            raw: segment.to_string(),
            name,
            value,
        }
    }

    fn set(&mut self, value: &str) {
        let raw_name = self.raw.split('=').next().unwrap_or_default();
        let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
        self.raw = format!("{raw_name}={encoded}");
        self.value = value.to_string();
    }
}

/// Parameter name → value pairs in arrival order.
///
/// Lookups see decoded values. Forwarding writes every segment back as it
/// arrived; only replaced values are re-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<Param>,
}

impl Query {
    /// Parse a raw `a=1&b=2` query string.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::default();
        }
        Self {
            params: raw.split('&').map(Param::parse).collect(),
        }
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// First value for `name` unless it is blank.
    pub fn non_blank(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    /// Replace the value of every `name` parameter.
    ///
    /// Returns false (and changes nothing) when the parameter is absent.
    pub fn replace(&mut self, name: &str, value: &str) -> bool {
        let mut replaced = false;
        for param in self.params.iter_mut().filter(|p| p.name == name) {
            param.set(value);
            replaced = true;
        }
        replaced
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Join the segments back into a query string, preserving order.
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|p| p.raw.as_str())
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query_string())
    }
}
