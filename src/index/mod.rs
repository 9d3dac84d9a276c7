// src/index/mod.rs

//! Package index resolution
//!
//! A `PackageIndex` answers "which package provides this file/soname" and
//! "what packages exist" for one distribution. Analyses run against two
//! independently configured instances (source distro, destination distro);
//! a soname no index can resolve flows through reports as the `Not Found`
//! sentinel instead of raising.

pub mod dnf;
pub mod repodb;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Sentinel standing in for "no package provides this"
pub const NOTFOUND: &str = "Not Found";

/// One provide row on the destination index, with the providing package's
/// `name-version.release` label when known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvideRow {
    pub name: String,
    pub version: Option<String>,
    pub package: Option<String>,
}

/// Query capability over one distribution's package index
pub trait PackageIndex {
    /// Packages providing a file/soname matching the glob-like pattern, in
    /// the index's natural order. Empty when nothing matches.
    fn provides(&self, pattern: &str, arch: &str) -> Result<Vec<String>>;

    /// Every package name the index carries for the arch
    fn list_all(&self, arch: &str) -> Result<Vec<String>>;

    /// The provide row whose name is exactly `name`, if any
    fn find_provide(&self, name: &str) -> Result<Option<ProvideRow>>;
}

/// Resolution of one soname against both indexes. An empty answer is
/// replaced by the `Not Found` sentinel, exactly once per index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SonameResolution {
    pub soname: String,
    pub source_packages: Vec<String>,
    pub dest_packages: Vec<String>,
}

impl SonameResolution {
    /// The package treated as "the" provider on the destination, when any
    pub fn primary_dest(&self) -> Option<&str> {
        self.dest_packages
            .first()
            .map(String::as_str)
            .filter(|p| *p != NOTFOUND)
    }

    pub fn primary_source(&self) -> Option<&str> {
        self.source_packages
            .first()
            .map(String::as_str)
            .filter(|p| *p != NOTFOUND)
    }
}

/// Resolves sonames against a source and a destination index
pub struct IndexResolver<'a> {
    source: &'a dyn PackageIndex,
    dest: &'a dyn PackageIndex,
    arch: String,
}

impl<'a> IndexResolver<'a> {
    pub fn new(source: &'a dyn PackageIndex, dest: &'a dyn PackageIndex, arch: &str) -> Self {
        Self {
            source,
            dest,
            arch: arch.to_string(),
        }
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn source(&self) -> &'a dyn PackageIndex {
        self.source
    }

    pub fn dest(&self) -> &'a dyn PackageIndex {
        self.dest
    }

    /// Resolve each soname to its providing packages on both indexes.
    /// Results are returned in input order.
    pub fn resolve(&self, sonames: &[String]) -> Result<Vec<SonameResolution>> {
        let mut resolutions = Vec::with_capacity(sonames.len());
        for soname in sonames {
            let pattern = format!("*{soname}*");
            let source_packages = or_notfound(self.source.provides(&pattern, &self.arch)?);
            let dest_packages = or_notfound(self.dest.provides(&pattern, &self.arch)?);
            debug!(
                soname = %soname,
                source = %source_packages.join(", "),
                dest = %dest_packages.join(", "),
                "resolved soname"
            );
            resolutions.push(SonameResolution {
                soname: soname.clone(),
                source_packages,
                dest_packages,
            });
        }
        Ok(resolutions)
    }
}

fn or_notfound(packages: Vec<String>) -> Vec<String> {
    if packages.is_empty() {
        vec![NOTFOUND.to_string()]
    } else {
        packages
    }
}

/// Strip a trailing `-libs`/`-lib` suffix to get a package's base name
pub fn base_package_name(name: &str) -> &str {
    let name = name.trim();
    if let Some(base) = name.strip_suffix("-libs") {
        return base;
    }
    if let Some(base) = name.strip_suffix("-lib") {
        return base;
    }
    name
}

/// Candidate devel package names for a base name
pub fn devel_candidates(base: &str) -> Vec<String> {
    vec![format!("{base}-devel"), format!("{base}-headers")]
}

/// Candidate runtime-lib package names for a base name. A base that already
/// carries `lib` in its name is its own runtime-lib package.
pub fn runtime_lib_candidates(base: &str) -> Vec<String> {
    if base.contains("lib") {
        vec![base.to_string()]
    } else {
        vec![format!("{base}-lib"), format!("{base}-libs")]
    }
}

/// Devel and runtime-lib companion packages derived for one index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportPackages {
    pub devel: Vec<String>,
    pub libs: Vec<String>,
}

/// Derive the devel/runtime-lib companions of `primary` packages that the
/// index actually carries. `carry` holds companions already derived on the
/// other distribution; any of them present verbatim in this index's package
/// list is kept too.
pub fn derive_support_packages(
    primary: &[String],
    carry: Option<&SupportPackages>,
    index: &dyn PackageIndex,
    arch: &str,
) -> Result<SupportPackages> {
    let known: HashSet<String> = index.list_all(arch)?.into_iter().collect();

    let mut support = SupportPackages::default();
    let mut seen_devel = HashSet::new();
    let mut seen_libs = HashSet::new();

    for package in primary {
        if *package == NOTFOUND {
            continue;
        }
        let base = base_package_name(package);
        for candidate in devel_candidates(base) {
            if known.contains(&candidate) && seen_devel.insert(candidate.clone()) {
                support.devel.push(candidate);
            }
        }
        for candidate in runtime_lib_candidates(base) {
            if known.contains(&candidate) && seen_libs.insert(candidate.clone()) {
                support.libs.push(candidate);
            }
        }
    }

    if let Some(carry) = carry {
        for package in &carry.devel {
            if known.contains(package) && seen_devel.insert(package.clone()) {
                support.devel.push(package.clone());
            }
        }
        for package in &carry.libs {
            if known.contains(package) && seen_libs.insert(package.clone()) {
                support.libs.push(package.clone());
            }
        }
    }

    Ok(support)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_package_name() {
        assert_eq!(base_package_name("openssl-libs"), "openssl");
        assert_eq!(base_package_name("zlib-lib"), "zlib");
        assert_eq!(base_package_name("glibc"), "glibc");
    }

    #[test]
    fn test_devel_candidates() {
        assert_eq!(
            devel_candidates("openssl"),
            vec!["openssl-devel", "openssl-headers"]
        );
    }

    #[test]
    fn test_runtime_lib_candidates_plain_base() {
        assert_eq!(
            runtime_lib_candidates("openssl"),
            vec!["openssl-lib", "openssl-libs"]
        );
    }

    #[test]
    fn test_runtime_lib_candidates_lib_in_base() {
        // A base already naming a library is its own runtime-lib package
        assert_eq!(runtime_lib_candidates("zlib"), vec!["zlib"]);
        assert_eq!(runtime_lib_candidates("glibc"), vec!["glibc"]);
    }

    /// Index with no contents at all
    struct EmptyIndex;

    impl PackageIndex for EmptyIndex {
        fn provides(&self, _pattern: &str, _arch: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn list_all(&self, _arch: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        fn find_provide(&self, _name: &str) -> Result<Option<ProvideRow>> {
            Ok(None)
        }
    }

    #[test]
    fn test_unresolvable_soname_gets_one_sentinel_per_index() {
        let source = EmptyIndex;
        let dest = EmptyIndex;
        let resolver = IndexResolver::new(&source, &dest, "x86_64");

        let resolutions = resolver
            .resolve(&["libnowhere.so.1".to_string()])
            .unwrap();

        assert_eq!(resolutions.len(), 1);
        assert_eq!(resolutions[0].source_packages, vec![NOTFOUND]);
        assert_eq!(resolutions[0].dest_packages, vec![NOTFOUND]);
    }

    #[test]
    fn test_primary_dest_skips_notfound() {
        let resolution = SonameResolution {
            soname: "libgone.so".into(),
            source_packages: vec!["gone".into()],
            dest_packages: vec![NOTFOUND.into()],
        };
        assert_eq!(resolution.primary_dest(), None);
        assert_eq!(resolution.primary_source(), Some("gone"));
    }
}
