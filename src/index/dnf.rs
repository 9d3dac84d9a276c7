// src/index/dnf.rs

//! dnf-backed package index
//!
//! Queries one distribution's repositories through `dnf repoquery` with an
//! explicit configuration file, so a source-distro index can live next to
//! the running system's own `/etc/dnf/dnf.conf`.

use crate::error::{Error, Result};
use crate::index::{PackageIndex, ProvideRow};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

const DNF: &str = "dnf";

/// Package index over a dnf configuration file
#[derive(Debug)]
pub struct DnfIndex {
    conf: PathBuf,
    label: String,
}

impl DnfIndex {
    /// Open an index for the given dnf configuration. Fails fast when the
    /// configuration file is missing or the dnf tool is not installed.
    pub fn open(conf: impl Into<PathBuf>, label: &str) -> Result<Self> {
        let conf = conf.into();
        if !conf.is_file() {
            return Err(Error::Config {
                path: conf,
                reason: "configuration file missing or unreadable".to_string(),
            });
        }
        if which::which(DNF).is_err() {
            return Err(Error::ToolMissing(DNF.to_string()));
        }
        Ok(Self {
            conf,
            label: label.to_string(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn conf(&self) -> &Path {
        &self.conf
    }

    fn repoquery(&self, args: &[&str]) -> Result<Vec<String>> {
        let output = Command::new(DNF)
            .arg("-c")
            .arg(&self.conf)
            .args(["repoquery", "--quiet"])
            .args(args)
            .env("LC_ALL", "C")
            .output()
            .map_err(|e| Error::Command {
                command: format!("{DNF} repoquery"),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Index(format!(
                "dnf repoquery against '{}' failed: {}",
                self.conf.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }
}

impl PackageIndex for DnfIndex {
    fn provides(&self, pattern: &str, arch: &str) -> Result<Vec<String>> {
        debug!(index = %self.label, pattern = %pattern, "querying providers");
        let names = self.repoquery(&[
            "--whatprovides",
            pattern,
            "--arch",
            arch,
            "--qf",
            "%{name}\n",
        ])?;

        let mut packages = Vec::new();
        for name in names {
            if !packages.contains(&name) {
                packages.push(name);
            }
        }
        if packages.is_empty() {
            debug!(index = %self.label, pattern = %pattern, "no provider found");
        }
        Ok(packages)
    }

    fn list_all(&self, arch: &str) -> Result<Vec<String>> {
        debug!(index = %self.label, arch = %arch, "listing all packages");
        let mut names = Vec::new();
        for name in self.repoquery(&["--arch", arch, "--qf", "%{name}\n"])? {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn find_provide(&self, name: &str) -> Result<Option<ProvideRow>> {
        // The provide version is approximated by the providing package's
        // version; repoquery does not expose the provide row itself.
        let rows = self.repoquery(&[
            "--whatprovides",
            name,
            "--qf",
            "%{name}|%{version}|%{release}\n",
        ])?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };
        let fields: Vec<&str> = first.split('|').collect();
        if fields.len() < 3 {
            warn!(index = %self.label, line = %first, "unexpected repoquery output");
            return Ok(None);
        }

        Ok(Some(ProvideRow {
            name: name.to_string(),
            version: Some(fields[1].to_string()),
            package: Some(format!("{}-{}.{}", fields[0], fields[1], fields[2])),
        }))
    }
}
