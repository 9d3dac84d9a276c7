// src/report/mod.rs

//! Aggregated compatibility reports
//!
//! One `CompatibilityReport` per analyzed unit (a binary or an installed
//! package) collects everything downstream renderers need: the tag set,
//! the provide map, the soname dependency graph with its per-index package
//! resolution, derived support packages and missing symbols.

use crate::abidump::{self, AbiDump};
use crate::compat::{CompatibilityTag, ProvideMapItem};
use crate::error::Result;
use crate::graph::{DependencyLister, GraphBuilder, SonameGraph};
use crate::index::{IndexResolver, SonameResolution, SupportPackages, derive_support_packages};
use crate::symbols::{Symbol, SymbolTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// The analysis record for one binary or package
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompatibilityReport {
    /// Binary path or package name the report describes
    pub subject: String,
    pub tags: Vec<CompatibilityTag>,
    pub provide_map: Vec<ProvideMapItem>,
    /// Per-soname package resolution against both indexes
    pub resolution: Vec<SonameResolution>,
    pub dependency_graph: Option<SonameGraph>,
    pub source_support: Option<SupportPackages>,
    pub dest_support: Option<SupportPackages>,
    pub missing_symbols: Vec<Symbol>,
}

impl CompatibilityReport {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Default::default()
        }
    }

    /// Attach a tag unless already present
    pub fn add_tag(&mut self, tag: CompatibilityTag) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn has_tag(&self, tag: CompatibilityTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn is_version_leaped(&self) -> bool {
        self.has_tag(CompatibilityTag::VersionLeaped)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Serialize a batch of reports (one scan run) as a JSON array
pub fn reports_to_json(reports: &[CompatibilityReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

/// Run the full binary analysis pipeline and fold the results into one
/// report.
///
/// The symbol listing and the dependency lister are collaborator output;
/// the engine itself never touches ELF data. The optional export dump adds
/// the missing-symbol diff.
pub fn analyze_binary(
    binary: &str,
    symbol_listing: &str,
    lister: &dyn DependencyLister,
    resolver: &IndexResolver<'_>,
    dump: Option<&AbiDump>,
) -> Result<CompatibilityReport> {
    let table = SymbolTable::parse(symbol_listing);
    info!(
        binary = %binary,
        symbols = table.len(),
        "parsed required symbol listing"
    );

    let graph = GraphBuilder::new(lister).build(binary)?;
    let resolution = resolver.resolve(&graph.required_sonames())?;

    let source_primary = primary_packages(&resolution, Side::Source);
    let dest_primary = primary_packages(&resolution, Side::Dest);

    let source_support =
        derive_support_packages(&source_primary, None, resolver.source(), resolver.arch())?;
    let dest_support = derive_support_packages(
        &dest_primary,
        Some(&source_support),
        resolver.dest(),
        resolver.arch(),
    )?;

    let mut report = CompatibilityReport::new(binary);
    report.add_tag(coverage_tag(&resolution));
    report.missing_symbols = dump
        .map(|d| abidump::diff(&table.symbols(), d).missing)
        .unwrap_or_default();
    report.resolution = resolution;
    report.dependency_graph = Some(graph);
    report.source_support = Some(source_support);
    report.dest_support = Some(dest_support);

    Ok(report)
}

enum Side {
    Source,
    Dest,
}

/// First providing package per soname, deduplicated in discovery order
fn primary_packages(resolution: &[SonameResolution], side: Side) -> Vec<String> {
    let mut packages = Vec::new();
    for entry in resolution {
        let primary = match side {
            Side::Source => entry.primary_source(),
            Side::Dest => entry.primary_dest(),
        };
        if let Some(package) = primary {
            if !packages.iter().any(|p| p == package) {
                packages.push(package.to_string());
            }
        }
    }
    packages
}

/// Coverage of the destination index over the required sonames, expressed
/// with the same mutually exclusive tags packages get
fn coverage_tag(resolution: &[SonameResolution]) -> CompatibilityTag {
    let found = resolution
        .iter()
        .filter(|r| r.primary_dest().is_some())
        .count();
    if found == 0 {
        CompatibilityTag::NothingProvided
    } else if found == resolution.len() {
        CompatibilityTag::AllProvided
    } else {
        CompatibilityTag::PartiallyProvided
    }
}
