// src/provides/mod.rs

//! Provide tuple parsing
//!
//! An installed package declares its capabilities as lines of the form
//! `capability = [epoch:]version[-release]` or a bare `capability`. Only
//! the version token is kept; epoch and release are stripped.

use serde::{Deserialize, Serialize};

/// One capability a package exposes, with its version token when declared
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProvideTuple {
    pub provide: String,
    pub version: Option<String>,
}

impl ProvideTuple {
    pub fn new(provide: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            provide: provide.into(),
            version: version.map(str::to_string),
        }
    }

    /// Parse one provides line. Empty lines yield None; a line without
    /// ` = ` is a bare unversioned capability.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match line.split_once(" = ") {
            Some((name, evr)) => Some(Self {
                provide: name.trim().to_string(),
                version: Some(version_token(evr)),
            }),
            None => Some(Self {
                provide: line.to_string(),
                version: None,
            }),
        }
    }
}

/// Extract the bare version from `[epoch:]version[-release]`
fn version_token(evr: &str) -> String {
    let evr = evr.trim();
    let without_epoch = match evr.split_once(':') {
        Some((_, rest)) => rest,
        None => evr,
    };
    match without_epoch.split_once('-') {
        Some((version, _release)) => version.to_string(),
        None => without_epoch.to_string(),
    }
}

/// Desktop-integration provides that say nothing about ABI compatibility
const FILTERED_MARKERS: [&str; 3] = ["application()", "metainfo()", "mimehandler("];

/// True for provide lines excluded from classification
pub fn is_filtered_provide(line: &str) -> bool {
    FILTERED_MARKERS.iter().any(|marker| line.contains(marker))
}

/// Parse a full `--provides` listing into tuples, applying the filters
pub fn parse_provide_listing(text: &str) -> Vec<ProvideTuple> {
    text.lines()
        .filter(|line| !is_filtered_provide(line))
        .filter_map(ProvideTuple::parse)
        .collect()
}
