// src/symbols/mod.rs

//! Versioned dynamic-symbol model
//!
//! Parses readelf-style symbol listings into `name@version` records. Only
//! lines carrying a `FUNC` dynamic-symbol record with a version suffix are
//! kept; everything else in the listing is skipped without error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// A versioned dynamic symbol as a binary requires it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    /// Version tag after the first `@`, e.g. `GLIBC_2.17`. None when the
    /// symbol is unversioned.
    pub version: Option<String>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// The fully qualified `name@version` form (just `name` if unversioned)
    pub fn qualified(&self) -> String {
        match &self.version {
            Some(v) => format!("{}@{}", self.name, v),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

/// Split a raw `name@version` token on the first `@`.
///
/// The segment before the `@` is the name, the segment after is the version.
/// A token without `@` yields an unversioned symbol. Never fails.
pub fn parse_symbol_version(raw: &str) -> Symbol {
    match raw.split_once('@') {
        Some((name, version)) => Symbol::new(name, Some(version.to_string())),
        None => Symbol::new(raw, None),
    }
}

/// Record shape of an accepted symbol line: numeric index, hex value,
/// numeric size, a FUNC marker and a versioned name somewhere after it.
fn symbol_record_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+):\s+([0-9a-f]+)\s+(\d+)\b.*FUNC.*@").expect("static pattern")
    })
}

/// Parsed symbol listing: three parallel sequences, each deduplicated on
/// first occurrence with input order preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    /// Fully qualified `name@version` tokens
    pub qualified: Vec<String>,
    /// Bare symbol names
    pub names: Vec<String>,
    /// Version tags
    pub versions: Vec<String>,
}

impl SymbolTable {
    /// Parse a raw symbol listing. Lines not matching the record shape are
    /// dropped silently.
    pub fn parse(listing: &str) -> Self {
        let pattern = symbol_record_pattern();

        let mut table = SymbolTable::default();
        let mut seen_qualified = HashSet::new();
        let mut seen_names = HashSet::new();
        let mut seen_versions = HashSet::new();

        for line in listing.lines() {
            let line = line.trim();
            if !pattern.is_match(line) {
                continue;
            }
            // The qualified name is the eighth whitespace-separated field
            // of a readelf record (index: value size type bind vis ndx name).
            let Some(token) = line.split_whitespace().nth(7) else {
                continue;
            };

            if seen_qualified.insert(token.to_string()) {
                table.qualified.push(token.to_string());
            }

            let symbol = parse_symbol_version(token);
            if seen_names.insert(symbol.name.clone()) {
                table.names.push(symbol.name.clone());
            }
            if let Some(version) = symbol.version {
                if !version.is_empty() && seen_versions.insert(version.clone()) {
                    table.versions.push(version);
                }
            }
        }

        table
    }

    /// The required symbols as structured records, in listing order
    pub fn symbols(&self) -> Vec<Symbol> {
        self.qualified
            .iter()
            .map(|q| parse_symbol_version(q))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.qualified.is_empty()
    }

    pub fn len(&self) -> usize {
        self.qualified.len()
    }
}
