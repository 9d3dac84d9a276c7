// src/lib.rs

//! abicheck — ABI/package compatibility analysis for distribution migration
//!
//! Given a binary (or an installed package's declared capabilities), the
//! engine determines the shared libraries and versioned dynamic symbols it
//! needs, which packages provide them on a source and a destination
//! distribution, and a compatibility classification usable to predict
//! breakage before migration.
//!
//! # Architecture
//!
//! - Text-in, structure-out: the engine consumes pre-extracted listings
//!   (readelf symbols, ldd dependencies, rpm provides) and never parses
//!   ELF or package bodies itself
//! - Two independent package indexes (source, destination) behind one
//!   `PackageIndex` trait, with dnf and repodata-sqlite backends
//! - Unresolved references flow through reports as the `Not Found`
//!   sentinel; only index configuration errors abort an analysis

pub mod abidump;
pub mod compat;
pub mod config;
mod error;
pub mod graph;
pub mod index;
pub mod listing;
pub mod packages;
pub mod provides;
pub mod report;
pub mod symbols;

pub use compat::{CompatibilityTag, ProvideMapItem, ProvidesMatcher};
pub use config::{AnalysisProfile, IndexBackend};
pub use error::{Error, Result};
pub use graph::{DependencyLister, DependencyNode, GraphBuilder, SonameGraph};
pub use index::{
    IndexResolver, NOTFOUND, PackageIndex, ProvideRow, SonameResolution, SupportPackages,
};
pub use provides::{ProvideTuple, parse_provide_listing};
pub use report::{CompatibilityReport, analyze_binary};
pub use symbols::{Symbol, SymbolTable, parse_symbol_version};
