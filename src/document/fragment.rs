//! Delimiter matching and textual field patching.
//!
//! # Responsibilities
//! - Pull bracketed substructures out of a document by depth counting
//! - Scan numeric literals that follow a field marker
//! - Rewrite numeric and string field values in place
//!
//! # Design Decisions
//! - Never builds a document model; unknown bytes are copied as-is
//! - Delimiters are counted naively (no awareness of string literals)
//! - Every operation is pure: text in, new text out

use thiserror::Error;

/// Terminator that ends a string-valued field in origin documents.
const FIELD_TERMINATOR: &str = ",\"";

/// Structural errors raised while taking a document apart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    /// Text did not start with the expected opening delimiter.
    #[error("expected '{expected}' at start of '{context}'")]
    UnexpectedStart { expected: char, context: String },

    /// Nesting never returned to zero before the text ended.
    #[error("unterminated '{open}' in '{context}'")]
    Unterminated { open: char, context: String },

    /// A field marker was not followed by a number.
    #[error("expected number after {marker}")]
    MissingNumber { marker: String },

    /// A start marker was found but not its end marker.
    #[error("expected '{end}' after {start}")]
    MissingTerminator { start: String, end: String },
}

/// Shorten text for error messages.
fn context(text: &str) -> String {
    const MAX: usize = 64;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Split `text` at the delimiter matching its first character.
///
/// Returns the content strictly between the outermost pair and everything
/// after the closing delimiter.
pub fn match_delimited(text: &str, open: char, close: char) -> Result<(&str, &str), PatchError> {
    if !text.starts_with(open) {
        return Err(PatchError::UnexpectedStart {
            expected: open,
            context: context(text),
        });
    }

    let mut depth = 0usize;
    for (idx, c) in text.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                let content = &text[open.len_utf8()..idx];
                let rest = &text[idx + close.len_utf8()..];
                return Ok((content, rest));
            }
        }
    }

    Err(PatchError::Unterminated {
        open,
        context: context(text),
    })
}

/// Length of the numeric literal at the start of `text`.
///
/// Accepts an optional sign, digits and a single decimal point.
fn numeric_len(text: &str) -> (usize, bool) {
    let bytes = text.as_bytes();
    let mut len = 0;
    let mut seen_digit = false;
    let mut seen_point = false;

    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        len = 1;
    }
    while let Some(&b) = bytes.get(len) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_point => seen_point = true,
            _ => break,
        }
        len += 1;
    }
    (len, seen_digit)
}

/// Return the numeric literal following the first occurrence of `marker`.
///
/// Yields `Ok(None)` when the marker does not occur at all.
pub fn scan_numeric_literal<'a>(text: &'a str, marker: &str) -> Result<Option<&'a str>, PatchError> {
    let Some(pos) = text.find(marker) else {
        return Ok(None);
    };
    let after = &text[pos + marker.len()..];
    let (len, seen_digit) = numeric_len(after);
    if !seen_digit {
        return Err(PatchError::MissingNumber {
            marker: marker.to_string(),
        });
    }
    Ok(Some(&after[..len]))
}

/// Replace every complete occurrence of `needle` with `replacement`.
///
/// An occurrence only counts when the character after it cannot extend the
/// numeric literal, so `"lat":12` never matches inside `"lat":123`.
fn replace_literal(text: &str, needle: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(needle) {
        let start = cursor + found;
        let end = start + needle.len();
        let extends = matches!(text.as_bytes().get(end), Some(b'0'..=b'9') | Some(b'.'));

        out.push_str(&text[cursor..start]);
        out.push_str(if extends { needle } else { replacement });
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Substitute the numeric value of the field introduced by `marker`.
///
/// The first occurrence determines the old value; every complete
/// `marker + old` is rewritten to `marker + value`. An absent marker leaves
/// the text unchanged.
pub fn replace_field(text: &str, marker: &str, value: &str) -> Result<String, PatchError> {
    let Some(old) = scan_numeric_literal(text, marker)? else {
        return Ok(text.to_string());
    };
    let needle = format!("{marker}{old}");
    let replacement = format!("{marker}{value}");
    Ok(replace_literal(text, &needle, &replacement))
}

/// Integer part of a scanned literal, `atoi` style.
fn integer_part(literal: &str) -> i64 {
    let end = literal.find('.').unwrap_or(literal.len());
    literal[..end].parse().unwrap_or(0)
}

/// Add `delta` to the integer value of the field introduced by `marker`.
pub fn shift_field(text: &str, marker: &str, delta: i64) -> Result<String, PatchError> {
    let Some(old) = scan_numeric_literal(text, marker)? else {
        return Ok(text.to_string());
    };
    let shifted = integer_part(old).saturating_add(delta);
    replace_field(text, marker, &shifted.to_string())
}

/// Substring between the first `start` and the next `end` after it.
///
/// Returns `Ok(None)` when `start` is absent.
pub fn between<'a>(text: &'a str, start: &str, end: &str) -> Result<Option<&'a str>, PatchError> {
    let Some(pos) = text.find(start) else {
        return Ok(None);
    };
    let after = &text[pos + start.len()..];
    match after.find(end) {
        Some(stop) => Ok(Some(&after[..stop])),
        None => Err(PatchError::MissingTerminator {
            start: start.to_string(),
            end: end.to_string(),
        }),
    }
}

/// Set a string-valued field (`"redirectionUrl":`, `"showMenuButton":` ...).
///
/// The old value runs up to the `,"` that starts the next field and is
/// replaced, wherever it occurs, by the quoted new value.
pub fn replace_string_field(text: &str, marker: &str, value: &str) -> Result<String, PatchError> {
    let Some(old) = between(text, marker, FIELD_TERMINATOR)? else {
        return Ok(text.to_string());
    };
    let needle = format!("{marker}{old}");
    let replacement = format!("{marker}\"{value}\"");
    Ok(text.replace(&needle, &replacement))
}
