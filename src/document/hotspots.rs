//! Hotspot document decomposition and reassembly.

use crate::document::fragment::{between, match_delimited, PatchError};

/// Every hotspot document starts with this marker.
pub const HOTSPOTS_MARKER: &str = "{\"hotspots\":";

const COUNT_MARKER: &str = "\"numberOfHotspots\":";
const BASE_URL_MARKER: &str = "\"baseURL\":\"";
const TITLE_MARKER: &str = "\"title\":\"";

/// A response body split into its hotspot objects and the trailing fields.
///
/// Fragments hold the text strictly inside each object's braces. The bytes
/// between objects and after the last one are kept so reassembly loses
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotspotDocument {
    fragments: Vec<String>,
    separators: Vec<String>,
    tail: String,
    rest: String,
    declared_count: Option<usize>,
}

/// Text up to the next object of the array, and the text from its `{`.
///
/// Objects after the first need a comma in between; only whitespace may
/// surround it.
fn next_object(cursor: &str, first: bool) -> Option<(&str, &str)> {
    let mut at = cursor.trim_start();
    if !first {
        at = at.strip_prefix(',')?.trim_start();
    }
    at.starts_with('{').then(|| (&cursor[..cursor.len() - at.len()], at))
}

impl HotspotDocument {
    /// Whether `body` looks like a hotspot document at all.
    pub fn is_hotspot_document(body: &str) -> bool {
        body.starts_with(HOTSPOTS_MARKER)
    }

    /// Decompose `body`. Returns `Ok(None)` for bodies without the marker.
    pub fn parse(body: &str) -> Result<Option<Self>, PatchError> {
        let Some(array) = body.strip_prefix(HOTSPOTS_MARKER) else {
            return Ok(None);
        };
        let (mut interior, rest) = match_delimited(array, '[', ']')?;

        let mut fragments = Vec::new();
        let mut separators = Vec::new();
        while let Some((separator, at)) = next_object(interior, fragments.is_empty()) {
            let (hotspot, after) = match_delimited(at, '{', '}')?;
            separators.push(separator.to_string());
            fragments.push(hotspot.to_string());
            interior = after;
        }
        if !interior.trim().is_empty() {
            tracing::debug!(tail = %interior, "Hotspot array has trailing content");
        }

        let declared_count = between(rest, COUNT_MARKER, ",\"")
            .ok()
            .flatten()
            .filter(|n| n.starts_with(|c: char| c.is_ascii_digit()))
            .and_then(|n| n.parse().ok());

        Ok(Some(Self {
            fragments,
            separators,
            tail: interior.to_string(),
            rest: rest.to_string(),
            declared_count,
        }))
    }

    /// Hotspot object texts, without their braces.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Everything after the closing `]` of the hotspot array.
    pub fn rest(&self) -> &str {
        &self.rest
    }

    /// The origin's `numberOfHotspots`, falling back to the fragment count.
    pub fn hotspot_count(&self) -> usize {
        self.declared_count.unwrap_or(self.fragments.len())
    }

    /// `baseURL` of the first hotspot with JSON escapes stripped.
    pub fn first_base_url(&self) -> Option<String> {
        let first = self.fragments.first()?;
        let url = between(first, BASE_URL_MARKER, "\"").ok().flatten()?;
        let url = url.replace('\\', "");
        (!url.is_empty()).then_some(url)
    }

    /// `title` of the first hotspot.
    pub fn first_title(&self) -> Option<String> {
        let first = self.fragments.first()?;
        let title = between(first, TITLE_MARKER, "\"").ok().flatten()?;
        (!title.is_empty()).then(|| title.to_string())
    }

    /// Apply `f` to every fragment.
    pub fn try_map_fragments<F>(mut self, mut f: F) -> Result<Self, PatchError>
    where
        F: FnMut(&str) -> Result<String, PatchError>,
    {
        for fragment in &mut self.fragments {
            *fragment = f(fragment)?;
        }
        Ok(self)
    }

    /// Concatenate marker, array and rest back into a document.
    pub fn reassemble(&self) -> String {
        let size = HOTSPOTS_MARKER.len()
            + self.rest.len()
            + self.tail.len()
            + self.separators.iter().map(String::len).sum::<usize>()
            + self.fragments.iter().map(|f| f.len() + 2).sum::<usize>()
            + 2;
        let mut out = String::with_capacity(size);
        out.push_str(HOTSPOTS_MARKER);
        out.push('[');
        for (separator, fragment) in self.separators.iter().zip(&self.fragments) {
            out.push_str(separator);
            out.push('{');
            out.push_str(fragment);
            out.push('}');
        }
        out.push_str(&self.tail);
        out.push(']');
        out.push_str(&self.rest);
        out
    }
}
