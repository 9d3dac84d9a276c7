// tests/binary_analysis.rs

//! End-to-end binary analysis: symbol listing + dependency graph +
//! two-index resolution + export-dump diff folded into one report.

mod common;

use abicheck::abidump::AbiDump;
use abicheck::{CompatibilityTag, IndexResolver, NOTFOUND, analyze_binary};
use common::{MemoryIndex, MemoryLister};

const SYMBOL_LISTING: &str = "\
Symbol table [ 5] '.dynsym' contains 4 entries:
  Num:            Value   Size Type    Bind   Vis          Ndx Name
    1: 0000000000000000      0 FUNC    GLOBAL DEFAULT    UNDEF SSL_read@OPENSSL_1_1_0
    2: 0000000000000000      0 FUNC    GLOBAL DEFAULT    UNDEF compress2@ZLIB_1.2.2
    3: 0000000000000000      0 FUNC    GLOBAL DEFAULT    UNDEF vanished_fn@OLDLIB_1.0
";

const DUMP: &str = "\
<dump>
  <symbols>
    <library name=\"libssl\">
      <symbol>SSL_read@@OPENSSL_1_1_0</symbol>
    </library>
    <library name=\"libz\">
      <symbol>compress2@@ZLIB_1.2.2</symbol>
    </library>
  </symbols>
</dump>
";

fn lister() -> MemoryLister {
    MemoryLister::new(&[
        (
            "/usr/bin/server",
            "\tlibssl.so.1.1 => /usr/lib64/libssl.so.1.1 (0x1)\n\
             \tlibz.so.1 => /usr/lib64/libz.so.1 (0x2)\n\
             \tlibold.so.0 => not found\n\
             \tlinux-vdso.so.1 (0x7fff)\n",
        ),
        (
            "/usr/lib64/libssl.so.1.1",
            "\tlibz.so.1 => /usr/lib64/libz.so.1 (0x2)\n",
        ),
        ("/usr/lib64/libz.so.1", ""),
    ])
}

fn source_index() -> MemoryIndex {
    MemoryIndex::new("x86_64")
        .with_file("/usr/lib64/libssl.so.1.1", "openssl-libs")
        .with_file("/usr/lib64/libz.so.1", "zlib")
        .with_file("/usr/lib64/libold.so.0", "oldlib")
        .with_package("openssl-devel")
        .with_package("zlib-devel")
}

fn dest_index() -> MemoryIndex {
    MemoryIndex::new("x86_64")
        .with_file("/usr/lib64/libssl.so.1.1", "openssl-libs")
        .with_file("/usr/lib64/libz.so.1", "zlib")
        .with_package("openssl-devel")
}

#[test]
fn test_full_binary_report() {
    let source = source_index();
    let dest = dest_index();
    let resolver = IndexResolver::new(&source, &dest, "x86_64");
    let dump = AbiDump::parse(DUMP).unwrap();

    let lister = lister();
    let report = analyze_binary(
        "/usr/bin/server",
        SYMBOL_LISTING,
        &lister,
        &resolver,
        Some(&dump),
    )
    .unwrap();

    assert_eq!(report.subject, "/usr/bin/server");

    // libold.so.0 exists on neither index: one Not Found entry per index
    let old = report
        .resolution
        .iter()
        .find(|r| r.soname == "libold.so.0")
        .expect("libold resolution present");
    assert_eq!(old.source_packages, vec!["oldlib"]);
    assert_eq!(old.dest_packages, vec![NOTFOUND]);

    // One soname unresolved on the destination: partial coverage
    assert_eq!(report.tags, vec![CompatibilityTag::PartiallyProvided]);

    // Graph: server, libssl, libz, libold; libz required twice, one node
    let graph = report.dependency_graph.as_ref().unwrap();
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.incoming("libz.so.1").len(), 2);
    assert!(!graph.node("libold.so.0").unwrap().resolved);

    // Devel companions derived from the providing packages
    let source_support = report.source_support.as_ref().unwrap();
    assert_eq!(source_support.devel, vec!["openssl-devel", "zlib-devel"]);
    // zlib and oldlib already name libraries, so they double as their own
    // runtime-lib packages
    assert_eq!(source_support.libs, vec!["openssl-libs", "zlib", "oldlib"]);

    // Destination misses zlib-devel but carries over openssl-devel
    let dest_support = report.dest_support.as_ref().unwrap();
    assert_eq!(dest_support.devel, vec!["openssl-devel"]);

    // vanished_fn is not exported by the destination dump
    let missing: Vec<&str> = report
        .missing_symbols
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(missing, vec!["vanished_fn"]);
}

#[test]
fn test_analysis_is_repeatable() {
    let source = source_index();
    let dest = dest_index();
    let resolver = IndexResolver::new(&source, &dest, "x86_64");
    let lister = lister();

    let first =
        analyze_binary("/usr/bin/server", SYMBOL_LISTING, &lister, &resolver, None).unwrap();
    let second =
        analyze_binary("/usr/bin/server", SYMBOL_LISTING, &lister, &resolver, None).unwrap();

    // Fresh visited state per build: identical graphs and resolutions
    let g1 = first.dependency_graph.as_ref().unwrap();
    let g2 = second.dependency_graph.as_ref().unwrap();
    assert_eq!(g1.sonames(), g2.sonames());
    assert_eq!(g1.edges(), g2.edges());
    assert_eq!(first.resolution, second.resolution);
}

#[test]
fn test_report_serializes_losslessly() {
    let source = source_index();
    let dest = dest_index();
    let resolver = IndexResolver::new(&source, &dest, "x86_64");
    let lister = lister();
    let dump = AbiDump::parse(DUMP).unwrap();

    let report = analyze_binary(
        "/usr/bin/server",
        SYMBOL_LISTING,
        &lister,
        &resolver,
        Some(&dump),
    )
    .unwrap();

    let json = report.to_json().unwrap();
    let back: abicheck::CompatibilityReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.subject, report.subject);
    assert_eq!(back.tags, report.tags);
    assert_eq!(back.resolution, report.resolution);
    assert_eq!(back.missing_symbols, report.missing_symbols);
}
