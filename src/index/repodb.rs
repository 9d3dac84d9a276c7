// src/index/repodb.rs

//! Repodata-backed package index
//!
//! Reads a createrepo `primary.sqlite` database directly (tables
//! `packages`, `provides`, `files`), the same metadata dnf consumes. Useful
//! when the destination distribution's repodata is mirrored locally and no
//! dnf configuration exists for it.

use crate::error::{Error, Result};
use crate::index::{PackageIndex, ProvideRow};
use glob::Pattern;
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use tracing::debug;

/// Package index over a repodata `primary.sqlite` file
#[derive(Debug)]
pub struct RepoDbIndex {
    conn: Connection,
    label: String,
}

impl RepoDbIndex {
    /// Open the index read-only. A missing or unopenable database is a
    /// configuration error for this index.
    pub fn open(path: impl Into<PathBuf>, label: &str) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(Error::Config {
                path,
                reason: "repodata database missing or unreadable".to_string(),
            });
        }
        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| Error::Config {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        debug!(index = %label, path = %path.display(), "opened repodata index");
        Ok(Self::from_connection(conn, label))
    }

    /// Wrap an already opened repodata connection
    pub fn from_connection(conn: Connection, label: &str) -> Self {
        Self {
            conn,
            label: label.to_string(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PackageIndex for RepoDbIndex {
    fn provides(&self, pattern: &str, arch: &str) -> Result<Vec<String>> {
        let matcher =
            Pattern::new(pattern).map_err(|e| Error::Index(format!("bad pattern '{pattern}': {e}")))?;

        // pkgKey order is the index's natural order; the first match is
        // "the" provider for single-valued mappings.
        let mut stmt = self.conn.prepare(
            "SELECT files.name, packages.name
             FROM files JOIN packages ON packages.pkgKey = files.pkgKey
             WHERE packages.arch = ?1
             ORDER BY packages.pkgKey",
        )?;
        let rows = stmt.query_map([arch], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut packages = Vec::new();
        for row in rows {
            let (file, package) = row?;
            if matcher.matches(&file) && !packages.contains(&package) {
                packages.push(package);
            }
        }
        debug!(
            index = %self.label,
            pattern = %pattern,
            matches = packages.len(),
            "file pattern lookup"
        );
        Ok(packages)
    }

    fn list_all(&self, arch: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM packages WHERE arch = ?1 ORDER BY pkgKey",
        )?;
        let rows = stmt.query_map([arch], |row| row.get::<_, String>(0))?;

        let mut names = Vec::new();
        for row in rows {
            let name = row?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn find_provide(&self, name: &str) -> Result<Option<ProvideRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT provides.name, provides.version,
                    packages.name, packages.version, packages.release
             FROM provides JOIN packages ON packages.pkgKey = provides.pkgKey
             WHERE provides.name = ?1
             ORDER BY provides.pkgKey
             LIMIT 1",
        )?;

        let mut rows = stmt.query([name])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let provide_name: String = row.get(0)?;
        let provide_version: Option<String> = row.get(1)?;
        let pkg_name: String = row.get(2)?;
        let pkg_version: Option<String> = row.get(3)?;
        let pkg_release: Option<String> = row.get(4)?;

        let package = format!(
            "{}-{}.{}",
            pkg_name,
            pkg_version.unwrap_or_default(),
            pkg_release.unwrap_or_default()
        );

        Ok(Some(ProvideRow {
            name: provide_name,
            version: provide_version,
            package: Some(package),
        }))
    }
}
