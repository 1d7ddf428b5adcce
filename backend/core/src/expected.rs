//! Expected-text set parsed from `param_.expected`.

use std::collections::BTreeSet;

use serde::Serialize;

/// Normalized set of expected texts.
///
/// The raw field is split on every comma; quoting does not protect commas, so
/// an expected text containing one is split in two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpectedSet {
    items: BTreeSet<String>,
}

impl ExpectedSet {
    /// Parse a raw list such as `"A", "B"`.
    ///
    /// An empty input yields a set holding the empty string.
    pub fn parse(raw: &str) -> Self {
        let items = raw.split(',').map(normalize).collect();
        Self { items }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.items.contains(text)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

fn normalize(piece: &str) -> String {
    let piece = piece.trim();
    let piece = piece.strip_prefix('"').unwrap_or(piece);
    let piece = piece.strip_suffix('"').unwrap_or(piece);
    piece.trim().to_string()
}
