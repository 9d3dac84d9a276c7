// src/listing/mod.rs

//! Listing collectors
//!
//! Thin wrappers around the external tools that produce the line-oriented
//! text the engine consumes: `eu-readelf -s` for dynamic symbols and `ldd`
//! for shared-library dependencies. No parsing happens here.

use crate::error::{Error, Result};
use crate::graph::DependencyLister;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

pub const READELF: &str = "eu-readelf";
pub const LDD: &str = "ldd";

/// Resolve a collector tool on PATH, failing with a clear message when it
/// is not installed
pub fn locate_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::ToolMissing(name.to_string()))
}

fn run_tool(tool: &str, args: &[&str]) -> Result<String> {
    let program = locate_tool(tool)?;
    debug!(tool = %tool, args = ?args, "running collector");
    let output = Command::new(program)
        .args(args)
        .env("LC_ALL", "C")
        .output()
        .map_err(|e| Error::Command {
            command: tool.to_string(),
            reason: e.to_string(),
        })?;
    if !output.status.success() {
        return Err(Error::Command {
            command: format!("{} {}", tool, args.join(" ")),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Raw `eu-readelf -s` output for a binary
pub fn collect_symbol_listing(binary: &str) -> Result<String> {
    run_tool(READELF, &["-s", binary])
}

/// `ldd`-backed dependency lister for the graph builder
pub struct LddLister;

impl DependencyLister for LddLister {
    fn list_dependencies(&self, target: &str) -> Result<String> {
        run_tool(LDD, &[target])
    }
}
