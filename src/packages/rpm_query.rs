// src/packages/rpm_query.rs

//! Query installed RPM packages from the system database
//!
//! This module provides functions to query the local RPM database
//! using the `rpm` command-line tool. The analysis engine consumes the
//! resulting text; it never parses package bodies itself.

use crate::error::{Error, Result};
use std::process::Command;
use tracing::{debug, warn};

/// Information about an installed RPM package
#[derive(Debug, Clone)]
pub struct InstalledRpmInfo {
    pub name: String,
    pub version: String,
    pub release: String,
    pub epoch: Option<u64>,
    pub arch: String,
}

impl InstalledRpmInfo {
    /// Get the full version string (epoch:version-release)
    pub fn full_version(&self) -> String {
        let mut v = String::new();
        if let Some(epoch) = self.epoch {
            if epoch > 0 {
                v.push_str(&format!("{}:", epoch));
            }
        }
        v.push_str(&self.version);
        if !self.release.is_empty() {
            v.push('-');
            v.push_str(&self.release);
        }
        v
    }
}

fn rpm_output(args: &[&str]) -> Result<std::process::Output> {
    Command::new("rpm")
        .args(args)
        .env("LC_ALL", "C")
        .output()
        .map_err(|e| Error::Command {
            command: "rpm".to_string(),
            reason: format!("{}. Is rpm installed?", e),
        })
}

/// List all installed package names
pub fn list_installed_packages() -> Result<Vec<String>> {
    debug!("Querying installed RPM packages");

    let output = rpm_output(&["-qa", "--queryformat", "%{NAME}\n"])?;
    if !output.status.success() {
        return Err(Error::Command {
            command: "rpm -qa".to_string(),
            reason: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let packages: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    debug!("Found {} installed packages", packages.len());
    Ok(packages)
}

/// Query basic information about an installed package
pub fn query_package(name: &str) -> Result<InstalledRpmInfo> {
    debug!("Querying package info: {}", name);

    let output = rpm_output(&[
        "-q",
        name,
        "--queryformat",
        "%{NAME}|%{VERSION}|%{RELEASE}|%{EPOCH}|%{ARCH}\n",
    ])?;
    if !output.status.success() {
        return Err(Error::PackageNotFound(name.to_string()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    // The same name may resolve to several installed packages (kernel and
    // friends); the first line is the deterministic answer.
    let line = stdout.lines().next().unwrap_or_default().trim();
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < 5 {
        return Err(Error::Command {
            command: format!("rpm -q {}", name),
            reason: format!("unexpected output format: {}", line),
        });
    }

    let epoch = if parts[3] == "(none)" || parts[3].is_empty() {
        None
    } else {
        parts[3].parse().ok()
    };

    Ok(InstalledRpmInfo {
        name: parts[0].to_string(),
        version: parts[1].to_string(),
        release: parts[2].to_string(),
        epoch,
        arch: if parts[4] == "(none)" {
            "noarch".to_string()
        } else {
            parts[4].to_string()
        },
    })
}

/// Query the raw provides listing of an installed package.
///
/// Returns the unfiltered `rpm -q --provides` lines; tuple parsing and
/// filtering live in `crate::provides`.
pub fn query_package_provides(name: &str) -> Result<String> {
    debug!("Querying provides for package: {}", name);

    let output = rpm_output(&["-q", "--provides", name])?;
    if !output.status.success() {
        warn!(
            "rpm -q --provides {} failed: {}",
            name,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Err(Error::PackageNotFound(name.to_string()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Check if RPM is available on this system
pub fn is_rpm_available() -> bool {
    Command::new("rpm")
        .args(["--version"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
