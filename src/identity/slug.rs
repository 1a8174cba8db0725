use std::borrow::Borrow;
use std::fmt;

use unicode_normalization::{UnicodeNormalization as _, char::is_combining_mark};

/// Normalized join key between a document region and its image.
///
/// Only [`resolve`] builds values, so every instance is lowercase ASCII alphanumerics separated
/// by single `-`. The empty id means "unfillable".
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct CanonicalRegionId(String);

impl CanonicalRegionId {
    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for the empty (unfillable) identifier.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalRegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalRegionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalRegionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<'de> serde::Deserialize<'de> for CanonicalRegionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(resolve(&raw))
    }
}

/// Normalize a region name or code into its [`CanonicalRegionId`].
///
/// Decomposes to NFD, drops combining marks and apostrophe-like characters, lowercases, and
/// collapses every run of non-`[a-z0-9]` characters into a single `-`, trimmed at both ends.
/// Pure and idempotent: `resolve(resolve(x).as_str()) == resolve(x)`.
pub fn resolve(raw: &str) -> CanonicalRegionId {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for c in raw.nfd() {
        if is_combining_mark(c) || is_apostrophe(c) {
            continue;
        }
        for lc in c.to_lowercase() {
            if is_combining_mark(lc) {
                continue;
            }
            if lc.is_ascii_alphanumeric() {
                if pending_sep && !out.is_empty() {
                    out.push('-');
                }
                pending_sep = false;
                out.push(lc);
            } else {
                pending_sep = true;
            }
        }
    }

    CanonicalRegionId(out)
}

fn is_apostrophe(c: char) -> bool {
    matches!(
        c,
        '\'' | '`' | '\u{2018}' | '\u{2019}' | '\u{00B4}' | '\u{02BC}'
    )
}

#[cfg(test)]
#[path = "../../tests/unit/identity/slug.rs"]
mod tests;
