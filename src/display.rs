//! Display transforms for long identifiers, sizes and dates.
//!
//! Long values (hashes, addresses, transaction hashes) are shown shortened
//! until the user expands them. Whether a field is expanded is tracked
//! explicitly in an [`ExpandState`]; the shortened text is never fed back
//! into [`shorten`].

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::Hash;

/// Values up to this many characters are never shortened.
pub const SHORTEN_THRESHOLD: usize = 20;

const HEAD_CHARS: usize = 10;
const TAIL_CHARS: usize = 8;
const ELLIPSIS: &str = "...";

/// Short date format used for registration timestamps.
pub const DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Text rendered for timestamps that cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

/// Render a byte count as mebibytes with two decimals, e.g. `"2.00 MB"`.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let mebibytes = bytes as f64 / 1024.0 / 1024.0;
    format!("{mebibytes:.2} MB")
}

/// Render an ISO-8601 timestamp as a short local date.
///
/// Timestamps with an offset are converted to the local time zone; naive
/// timestamps (as the service emits them) are taken as-is.
#[must_use]
pub fn format_date(iso: &str) -> String {
    let iso = iso.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return dt.with_timezone(&Local).format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        return date.format(DATE_FORMAT).to_string();
    }
    INVALID_DATE.to_string()
}

/// Shorten a long identifier to its first 10 and last 8 characters.
///
/// Values of at most [`SHORTEN_THRESHOLD`] characters come back unchanged.
#[must_use]
pub fn shorten(text: &str) -> Cow<'_, str> {
    let len = text.chars().count();
    if len <= SHORTEN_THRESHOLD {
        return Cow::Borrowed(text);
    }
    let head: String = text.chars().take(HEAD_CHARS).collect();
    let tail: String = text.chars().skip(len - TAIL_CHARS).collect();
    Cow::Owned(format!("{head}{ELLIPSIS}{tail}"))
}

/// Full text when `expanded`, shortened otherwise.
#[must_use]
pub fn display_text(text: &str, expanded: bool) -> Cow<'_, str> {
    if expanded {
        Cow::Borrowed(text)
    } else {
        shorten(text)
    }
}

/// Kind of long field shown on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Content fingerprint.
    Hash,
    /// Author address.
    Address,
    /// Ledger transaction hash.
    TxHash,
}

/// Key of one expandable field: record identity plus field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKey {
    /// Record identity.
    pub record: u64,
    /// Which field of the record.
    pub kind: FieldKind,
}

impl FieldKey {
    /// Create a new field key.
    #[must_use]
    pub fn new(record: u64, kind: FieldKind) -> Self {
        Self { record, kind }
    }
}

/// Independent expanded/collapsed flags, all collapsed by default.
#[derive(Debug, Clone)]
pub struct ExpandState<K> {
    expanded: HashMap<K, bool>,
}

impl<K: Eq + Hash> ExpandState<K> {
    /// Create an empty state (everything collapsed).
    #[must_use]
    pub fn new() -> Self {
        Self {
            expanded: HashMap::new(),
        }
    }

    /// Whether the field at `key` is expanded.
    #[must_use]
    pub fn is_expanded(&self, key: &K) -> bool {
        self.expanded.get(key).copied().unwrap_or(false)
    }

    /// Flip the field at `key` and return its new state.
    pub fn toggle(&mut self, key: K) -> bool {
        let flag = self.expanded.entry(key).or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// Collapse everything.
    pub fn clear(&mut self) {
        self.expanded.clear();
    }
}

impl<K: Eq + Hash> Default for ExpandState<K> {
    fn default() -> Self {
        Self::new()
    }
}
