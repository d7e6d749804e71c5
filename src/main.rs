use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};
use wasm_info::{parser, report::Report};

/// Print memory limits, target width and the import/export catalog of a
/// WebAssembly module.
#[derive(Parser, Debug)]
#[command(name = "wasm-info", version, about)]
struct Cli {
    /// Path to the `.wasm` file
    file: PathBuf,

    /// Print the parsed module as JSON
    #[arg(long)]
    json: bool,

    /// Log every decoded section to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::Registry::default()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .try_init()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let bytes = std::fs::read(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let info = parser::parse(&bytes)
        .with_context(|| format!("failed to parse {}", cli.file.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("WASM File: {}", cli.file.display());
        print!("{}", Report::new(&info, bytes.len()));
    }
    Ok(())
}
