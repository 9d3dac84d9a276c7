// src/config.rs

//! Analysis profile
//!
//! A TOML file naming the two package indexes (source distro, destination
//! distro) and the target architecture. Each index is independently
//! configured; a missing or unreadable profile or backend is a fatal
//! configuration error, never silently defaulted.
//!
//! ```toml
//! arch = "x86_64"
//!
//! [source]
//! backend = "dnf"
//! conf = "/etc/abicheck/source-dnf.conf"
//!
//! [destination]
//! backend = "repodb"
//! path = "/var/lib/abicheck/destination-primary.sqlite"
//! ```

use crate::error::{Error, Result};
use crate::index::PackageIndex;
use crate::index::dnf::DnfIndex;
use crate::index::repodb::RepoDbIndex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// One index backend declaration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum IndexBackend {
    /// dnf repositories behind an explicit configuration file
    Dnf { conf: PathBuf },
    /// A repodata `primary.sqlite` mirror
    Repodb { path: PathBuf },
}

impl IndexBackend {
    /// Open the configured index, failing fast on configuration errors
    pub fn open(&self, label: &str) -> Result<Box<dyn PackageIndex>> {
        match self {
            IndexBackend::Dnf { conf } => Ok(Box::new(DnfIndex::open(conf, label)?)),
            IndexBackend::Repodb { path } => Ok(Box::new(RepoDbIndex::open(path, label)?)),
        }
    }
}

/// The analysis profile: both indexes plus the target arch
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AnalysisProfile {
    /// Target architecture; defaults to the machine the tool runs on
    pub arch: Option<String>,
    pub source: IndexBackend,
    pub destination: IndexBackend,
}

impl AnalysisProfile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let profile: AnalysisProfile = toml::from_str(&text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!(profile = %path.display(), "loaded analysis profile");
        Ok(profile)
    }

    /// The effective architecture for index queries
    pub fn arch(&self) -> String {
        self.arch
            .clone()
            .unwrap_or_else(|| std::env::consts::ARCH.to_string())
    }
}
