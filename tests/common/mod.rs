// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

use abicheck::graph::DependencyLister;
use abicheck::{PackageIndex, ProvideRow, Result};
use std::collections::HashMap;

/// In-memory package index: file provides, provide rows and a package list
/// for one fake distribution.
pub struct MemoryIndex {
    /// (file path, providing package), in index order
    pub files: Vec<(String, String)>,
    pub provide_rows: Vec<ProvideRow>,
    pub all_packages: Vec<String>,
    pub arch: String,
}

impl MemoryIndex {
    pub fn new(arch: &str) -> Self {
        Self {
            files: Vec::new(),
            provide_rows: Vec::new(),
            all_packages: Vec::new(),
            arch: arch.to_string(),
        }
    }

    pub fn with_file(mut self, path: &str, package: &str) -> Self {
        self.files.push((path.to_string(), package.to_string()));
        if !self.all_packages.contains(&package.to_string()) {
            self.all_packages.push(package.to_string());
        }
        self
    }

    pub fn with_package(mut self, name: &str) -> Self {
        if !self.all_packages.contains(&name.to_string()) {
            self.all_packages.push(name.to_string());
        }
        self
    }
}

impl PackageIndex for MemoryIndex {
    fn provides(&self, pattern: &str, arch: &str) -> Result<Vec<String>> {
        if arch != self.arch {
            return Ok(Vec::new());
        }
        // Patterns are `*soname*`; substring matching is enough here
        let needle = pattern.trim_matches('*');
        let mut packages = Vec::new();
        for (file, package) in &self.files {
            if file.contains(needle) && !packages.contains(package) {
                packages.push(package.clone());
            }
        }
        Ok(packages)
    }

    fn list_all(&self, arch: &str) -> Result<Vec<String>> {
        if arch != self.arch {
            return Ok(Vec::new());
        }
        Ok(self.all_packages.clone())
    }

    fn find_provide(&self, name: &str) -> Result<Option<ProvideRow>> {
        Ok(self.provide_rows.iter().find(|r| r.name == name).cloned())
    }
}

/// Dependency lister over canned ldd output
pub struct MemoryLister {
    listings: HashMap<String, String>,
}

impl MemoryLister {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            listings: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl DependencyLister for MemoryLister {
    fn list_dependencies(&self, target: &str) -> Result<String> {
        Ok(self.listings.get(target).cloned().unwrap_or_default())
    }
}
