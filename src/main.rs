// src/main.rs

use abicheck::listing::LddLister;
use abicheck::packages::rpm_query;
use abicheck::{
    AnalysisProfile, IndexResolver, ProvidesMatcher, SymbolTable, abidump, analyze_binary,
    listing, parse_provide_listing, report,
};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "abicheck")]
#[command(author, version, about = "ABI and package compatibility checker for distribution migration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one binary's library and symbol requirements against both
    /// distribution indexes
    Analyze {
        /// Path to the binary to analyze
        binary: String,
        /// Analysis profile (TOML) naming the source and destination indexes
        #[arg(short, long, default_value = "/etc/abicheck/profile.toml")]
        profile: PathBuf,
        /// ABI export dump of the destination libraries, for symbol diffing
        #[arg(long)]
        dump: Option<PathBuf>,
        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Classify every installed package's provides against the destination
    /// index
    ScanPackages {
        /// Analysis profile (TOML) naming the destination index
        #[arg(short, long, default_value = "/etc/abicheck/profile.toml")]
        profile: PathBuf,
        /// Only report packages whose version leaped
        #[arg(long)]
        only_leaped: bool,
        /// Skip font packages
        #[arg(long)]
        exclude_fonts: bool,
        /// Skip kernel-modules packages
        #[arg(long)]
        exclude_kernel_modules: bool,
        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Diff a required-symbol listing against an ABI export dump
    DiffDump {
        /// Readelf symbol listing of the binary
        #[arg(long)]
        symbols: PathBuf,
        /// ABI export dump of the destination library
        #[arg(long)]
        dump: PathBuf,
        /// Write the JSON result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            binary,
            profile,
            dump,
            output,
        } => cmd_analyze(&binary, &profile, dump.as_deref(), output.as_deref()),
        Commands::ScanPackages {
            profile,
            only_leaped,
            exclude_fonts,
            exclude_kernel_modules,
            output,
        } => cmd_scan_packages(
            &profile,
            only_leaped,
            exclude_fonts,
            exclude_kernel_modules,
            output.as_deref(),
        ),
        Commands::DiffDump {
            symbols,
            dump,
            output,
        } => cmd_diff_dump(&symbols, &dump, output.as_deref()),
    }
}

fn cmd_analyze(
    binary: &str,
    profile_path: &std::path::Path,
    dump_path: Option<&std::path::Path>,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let profile = AnalysisProfile::load(profile_path)?;
    let source = profile.source.open("source")?;
    let dest = profile.destination.open("destination")?;
    let arch = profile.arch();
    let resolver = IndexResolver::new(source.as_ref(), dest.as_ref(), &arch);

    info!("Checking ELF information of file {binary} ...");
    let symbol_listing = listing::collect_symbol_listing(binary)?;

    let dump = dump_path.map(abidump::AbiDump::from_file).transpose()?;

    let report = analyze_binary(binary, &symbol_listing, &LddLister, &resolver, dump.as_ref())?;
    emit(&report.to_json()?, output)
}

fn cmd_scan_packages(
    profile_path: &std::path::Path,
    only_leaped: bool,
    exclude_fonts: bool,
    exclude_kernel_modules: bool,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let profile = AnalysisProfile::load(profile_path)?;
    let dest = profile.destination.open("destination")?;
    let matcher = ProvidesMatcher::new(dest.as_ref());

    let mut packages = rpm_query::list_installed_packages()?;
    if exclude_fonts {
        packages.retain(|p| !p.contains("fonts"));
    }
    if exclude_kernel_modules {
        packages.retain(|p| !p.contains("kernel-modules"));
    }
    info!("Classifying {} installed packages ...", packages.len());

    let mut reports = Vec::new();
    for name in &packages {
        let provides_listing = match rpm_query::query_package_provides(name) {
            Ok(listing) => listing,
            Err(err) => {
                warn!("Skipping {name}: {err}");
                continue;
            }
        };
        let tuples = parse_provide_listing(&provides_listing);
        let package_report = matcher.classify(name, &tuples)?;
        if !only_leaped || package_report.is_version_leaped() {
            reports.push(package_report);
        }
    }

    emit(&report::reports_to_json(&reports)?, output)
}

fn cmd_diff_dump(
    symbols: &std::path::Path,
    dump: &std::path::Path,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let symbol_listing = std::fs::read_to_string(symbols)?;
    let table = SymbolTable::parse(&symbol_listing);
    let dump = abidump::AbiDump::from_file(dump)?;

    let diff = abidump::diff(&table.symbols(), &dump);
    info!(
        "{} of {} required symbols missing from the export dump",
        diff.missing.len(),
        diff.required.len()
    );
    emit(&serde_json::to_string_pretty(&diff)?, output)
}

fn emit(json: &str, output: Option<&std::path::Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("The check result is {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
