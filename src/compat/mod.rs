// src/compat/mod.rs

//! Provides-based migration compatibility classification
//!
//! For one installed package, matches every declared provide against the
//! destination index and folds the per-provide results into a tag set:
//! exactly one of `Nothing provided` / `All provided` / `Partially
//! provided`, plus the orthogonal `Version leaped` signal.

use crate::error::Result;
use crate::index::{PackageIndex, ProvideRow};
use crate::provides::ProvideTuple;
use crate::report::CompatibilityReport;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumString};
use tracing::debug;

/// Migration compatibility tags attached to one analyzed unit
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum CompatibilityTag {
    #[strum(serialize = "Nothing provided")]
    #[serde(rename = "Nothing provided")]
    NothingProvided,
    #[strum(serialize = "All provided")]
    #[serde(rename = "All provided")]
    AllProvided,
    #[strum(serialize = "Partially provided")]
    #[serde(rename = "Partially provided")]
    PartiallyProvided,
    #[strum(serialize = "Version leaped")]
    #[serde(rename = "Version leaped")]
    VersionLeaped,
}

/// One origin provide paired with its best destination match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvideMapItem {
    pub origin: ProvideTuple,
    /// The destination provide row with the identical name, when one exists
    pub destination: Option<ProvideTuple>,
    /// `name-version.release` label of the destination package providing it
    pub dest_package: Option<String>,
    pub name_match: bool,
    pub version_match: bool,
}

impl ProvideMapItem {
    /// True when both versions are present and their leading characters
    /// differ. Comparisons with either side absent are unknown, never a
    /// leap signal.
    pub fn version_leaps(&self) -> bool {
        match (self.origin.version.as_deref(), self.dest_version()) {
            (Some(origin), Some(dest)) => leading_char(origin) != leading_char(dest),
            _ => false,
        }
    }

    fn dest_version(&self) -> Option<&str> {
        self.destination.as_ref()?.version.as_deref()
    }
}

/// First character of a version string.
///
/// The leap heuristic is deliberately character-level, not a parsed major
/// version: "10.x" and "1.x" compare as equal-leading. See DESIGN.md for
/// the comparison choice.
fn leading_char(version: &str) -> Option<char> {
    version.chars().next()
}

/// Classifies one package's provides against a destination index
pub struct ProvidesMatcher<'a> {
    dest: &'a dyn PackageIndex,
}

impl<'a> ProvidesMatcher<'a> {
    pub fn new(dest: &'a dyn PackageIndex) -> Self {
        Self { dest }
    }

    /// Classify `package` given its origin provide tuples.
    ///
    /// Each distinct provide name is queried at most once; the returned
    /// report carries the full provide map and the aggregated tags.
    pub fn classify(
        &self,
        package: &str,
        origin_provides: &[ProvideTuple],
    ) -> Result<CompatibilityReport> {
        let mut cache: HashMap<String, Option<ProvideRow>> = HashMap::new();
        let mut provide_map = Vec::with_capacity(origin_provides.len());

        for origin in origin_provides {
            let row = match cache.get(&origin.provide) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.dest.find_provide(&origin.provide)?;
                    cache.insert(origin.provide.clone(), fetched.clone());
                    fetched
                }
            };

            let destination = row.as_ref().map(|r| ProvideTuple {
                provide: r.name.clone(),
                version: r.version.clone(),
            });
            let dest_package = row.as_ref().and_then(|r| r.package.clone());
            let name_match = destination.is_some();
            let version_match = match (
                origin.version.as_deref(),
                destination.as_ref().and_then(|d| d.version.as_deref()),
            ) {
                (Some(o), Some(d)) => leading_char(o) == leading_char(d),
                // Both absent is unknown, not a match
                _ => false,
            };

            provide_map.push(ProvideMapItem {
                origin: origin.clone(),
                destination,
                dest_package,
                name_match,
                version_match,
            });
        }

        let matched = provide_map.iter().filter(|m| m.name_match).count();
        let leaped = provide_map.iter().any(ProvideMapItem::version_leaps);

        let mut report = CompatibilityReport::new(package);
        if matched == 0 {
            report.add_tag(CompatibilityTag::NothingProvided);
        } else if matched == provide_map.len() {
            report.add_tag(CompatibilityTag::AllProvided);
        } else {
            report.add_tag(CompatibilityTag::PartiallyProvided);
        }
        if leaped {
            report.add_tag(CompatibilityTag::VersionLeaped);
        }
        report.provide_map = provide_map;

        debug!(
            package = %package,
            provides = origin_provides.len(),
            matched,
            leaped,
            "classified package"
        );
        Ok(report)
    }
}
