// tests/package_scan.rs

//! Installed-package classification against a repodata sqlite index,
//! driven from raw `--provides` listing text.

use abicheck::index::repodb::RepoDbIndex;
use abicheck::{CompatibilityTag, ProvidesMatcher, parse_provide_listing};
use rusqlite::Connection;
use tempfile::TempDir;

/// Create a repodata primary.sqlite fixture on disk.
///
/// Returns (TempDir, db_path) - keep the TempDir alive to prevent cleanup.
fn setup_repodb() -> (TempDir, String) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir
        .path()
        .join("primary.sqlite")
        .to_str()
        .unwrap()
        .to_string();

    let conn = Connection::open(&db_path).unwrap();
    conn.execute_batch(
        "CREATE TABLE packages (
             pkgKey INTEGER PRIMARY KEY,
             name TEXT, arch TEXT, version TEXT, release TEXT
         );
         CREATE TABLE provides (
             name TEXT, flags TEXT, epoch TEXT, version TEXT,
             release TEXT, pkgKey INTEGER
         );
         CREATE TABLE files (name TEXT, type TEXT, pkgKey INTEGER);

         INSERT INTO packages VALUES (1, 'bash', 'x86_64', '5.1.8', '5.oe1');
         INSERT INTO packages VALUES (2, 'ncurses-libs', 'x86_64', '6.3', '2.oe1');

         INSERT INTO provides VALUES ('bash', NULL, '0', '5.1.8', '5.oe1', 1);
         INSERT INTO provides VALUES ('config(bash)', NULL, '0', '5.1.8', '5.oe1', 1);
         INSERT INTO provides VALUES ('libtinfo.so.6()(64bit)', NULL, NULL, NULL, NULL, 2);",
    )
    .unwrap();
    drop(conn);

    (temp_dir, db_path)
}

const BASH_PROVIDES: &str = "\
bash = 4.4.20-1.el8
config(bash) = 4.4.20-1.el8
application() = bash.desktop
/bin/sh
";

#[test]
fn test_classify_against_repodb() {
    let (_tmp, db_path) = setup_repodb();
    let dest = RepoDbIndex::open(&db_path, "destination").unwrap();

    let tuples = parse_provide_listing(BASH_PROVIDES);
    // The desktop-integration provide is filtered before classification
    assert_eq!(tuples.len(), 3);

    let report = ProvidesMatcher::new(&dest).classify("bash", &tuples).unwrap();

    // /bin/sh has no destination provide row: partial coverage
    assert!(report.has_tag(CompatibilityTag::PartiallyProvided));
    // 4.x -> 5.x leading characters differ
    assert!(report.has_tag(CompatibilityTag::VersionLeaped));

    let bash_item = report
        .provide_map
        .iter()
        .find(|m| m.origin.provide == "bash")
        .unwrap();
    assert!(bash_item.name_match);
    assert!(!bash_item.version_match);
    assert_eq!(
        bash_item.destination.as_ref().unwrap().version.as_deref(),
        Some("5.1.8")
    );
    assert_eq!(bash_item.dest_package.as_deref(), Some("bash-5.1.8.5.oe1"));
}

#[test]
fn test_classify_unknown_package_nothing_provided() {
    let (_tmp, db_path) = setup_repodb();
    let dest = RepoDbIndex::open(&db_path, "destination").unwrap();

    let tuples = parse_provide_listing("leftpad = 0.1-1.el8\n");
    let report = ProvidesMatcher::new(&dest)
        .classify("leftpad", &tuples)
        .unwrap();

    assert_eq!(report.tags, vec![CompatibilityTag::NothingProvided]);
    assert!(!report.is_version_leaped());
}

#[test]
fn test_unversioned_destination_provide_is_unknown_not_leap() {
    let (_tmp, db_path) = setup_repodb();
    let dest = RepoDbIndex::open(&db_path, "destination").unwrap();

    let tuples = parse_provide_listing("libtinfo.so.6()(64bit)\n");
    let report = ProvidesMatcher::new(&dest)
        .classify("ncurses-libs", &tuples)
        .unwrap();

    assert_eq!(report.tags, vec![CompatibilityTag::AllProvided]);
    let item = &report.provide_map[0];
    assert!(item.name_match);
    assert!(!item.version_match);
}
