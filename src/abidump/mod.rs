// src/abidump/mod.rs

//! ABI export dump parsing and symbol diffing
//!
//! An export dump lists, per library, the fully qualified symbols
//! (`name@@version`) the library exposes. Diffing a binary's required
//! symbol set against a dump flags symbols that are entirely absent;
//! version suffixes are not compared.

use crate::error::{Error, Result};
use crate::symbols::Symbol;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Exported symbol surface of one library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryExport {
    pub name: String,
    /// Fully qualified `name@@version` entries as dumped
    pub symbols: Vec<String>,
}

/// Parsed ABI export dump: one symbol list per library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiDump {
    pub libraries: Vec<LibraryExport>,
}

impl AbiDump {
    /// Parse a dump document of the shape
    /// `<symbols><library name="..."><symbol>foo@@VER</symbol>...`.
    ///
    /// Dumper output can carry stray `& ` artifacts in the text; they are
    /// stripped before parsing.
    pub fn parse(text: &str) -> Result<Self> {
        let cleaned = text.replace("& ", "");
        let mut reader = Reader::from_str(&cleaned);

        let mut dump = AbiDump::default();
        let mut in_symbols = false;
        let mut current: Option<LibraryExport> = None;
        let mut in_symbol = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"symbols" => in_symbols = true,
                    b"library" if in_symbols => {
                        let name = e
                            .try_get_attribute("name")
                            .map_err(|err| Error::AbiDump(err.to_string()))?
                            .and_then(|a| a.unescape_value().ok())
                            .map(|v| v.into_owned())
                            .unwrap_or_default();
                        current = Some(LibraryExport {
                            name,
                            symbols: Vec::new(),
                        });
                    }
                    b"symbol" if current.is_some() => in_symbol = true,
                    _ => {}
                },
                Ok(Event::Text(t)) if in_symbol => {
                    let text = t
                        .unescape()
                        .map_err(|err| Error::AbiDump(err.to_string()))?;
                    let symbol = text.trim();
                    if !symbol.is_empty() {
                        if let Some(library) = current.as_mut() {
                            library.symbols.push(symbol.to_string());
                        }
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"symbol" => in_symbol = false,
                    b"library" => {
                        if let Some(library) = current.take() {
                            dump.libraries.push(library);
                        }
                    }
                    b"symbols" => in_symbols = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => return Err(Error::AbiDump(err.to_string())),
            }
        }

        debug!(libraries = dump.libraries.len(), "parsed ABI export dump");
        Ok(dump)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Bare exported symbol names across all libraries, version suffix
    /// after the `@@` marker stripped
    pub fn exported_names(&self) -> HashSet<String> {
        self.libraries
            .iter()
            .flat_map(|l| l.symbols.iter())
            .map(|s| match s.split_once("@@") {
                Some((name, _version)) => name.to_string(),
                None => s.clone(),
            })
            .collect()
    }
}

/// Result of diffing a required symbol set against an export dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDiff {
    /// Required symbols with no exported counterpart, sorted by name
    pub missing: Vec<Symbol>,
    /// The full requirement set the diff ran against
    pub required: Vec<Symbol>,
}

/// Compute the required symbols absent from the dump, by bare name
pub fn diff(required: &[Symbol], dump: &AbiDump) -> SymbolDiff {
    let exported = dump.exported_names();

    let mut seen = HashSet::new();
    let mut missing: Vec<Symbol> = required
        .iter()
        .filter(|s| !exported.contains(&s.name))
        .filter(|s| seen.insert(s.name.clone()))
        .cloned()
        .collect();
    missing.sort_by(|a, b| a.name.cmp(&b.name));

    SymbolDiff {
        missing,
        required: required.to_vec(),
    }
}
