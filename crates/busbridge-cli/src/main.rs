//! protoc-gen-busbridge - protoc plugin emitting message-bus service adaptors
//!
//! Invoked by protoc with no subcommand: reads a `CodeGeneratorRequest` from
//! stdin and writes a `CodeGeneratorResponse` to stdout. Logs go to stderr.
//!
//! Commands:
//! - `protoc-gen-busbridge export-templates <dir>` - Write the embedded
//!   templates to a directory as a starting point for overrides

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod frontend;
mod logging;
mod plugin;

use config::Config;
use logging::Logging;

#[derive(Parser)]
#[command(name = "protoc-gen-busbridge")]
#[command(author, version, about = "protoc plugin for message-bus service adaptors", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, env = "BUSBRIDGE_DEBUG")]
    debug: bool,

    /// Path to a config file (default: ~/.busbridge.toml if present)
    #[arg(long, env = "BUSBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the embedded templates to a directory
    ExportTemplates {
        /// Output directory
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let (subscriber, logging) = Logging::init(cli.debug || config.debug);

    tracing::subscriber::with_default(subscriber, || match cli.command {
        Some(Commands::ExportTemplates { output }) => export_templates(&output),
        None => plugin::run(
            &config,
            &logging,
            std::io::stdin().lock(),
            std::io::stdout().lock(),
        ),
    })
}

fn export_templates(output: &std::path::Path) -> Result<()> {
    let templates = busbridge_codegen::TemplateSet::embedded();
    for kind in busbridge_codegen::TemplateKind::ALL {
        let path = output.join(kind.file_name());
        busbridge_codegen::write_atomic(&path, templates.source(kind).as_bytes())
            .with_context(|| format!("Failed to write template {path:?}"))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}
