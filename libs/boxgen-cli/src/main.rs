//! boxgen: command-line STL exporter for the parametric box generator.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=boxgen_mesh=info` - Part summaries and lid strategy
//! - `RUST_LOG=boxgen_mesh=debug` - Grid, CSG and text details
//!
//! Without `RUST_LOG`, `-v` enables info output and `-vv` debug output.
//!
//! # Example
//!
//! ```bash
//! boxgen defaults > params.json
//! boxgen generate params.json --out-dir out/ --part lid
//! RUST_LOG=debug boxgen inspect params.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use boxgen_mesh::{BoxParams, PartKind, TextRasterizer};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{defaults, generate, inspect};

/// boxgen - Generate printable storage boxes with lids and hinges.
#[derive(Parser, Debug)]
#[command(name = "boxgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate STL files
    Generate {
        /// Parameter record (JSON); defaults when omitted
        params: Option<PathBuf>,

        /// Directory the STL files are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// TrueType font for lid text; the built-in bitmap font when omitted
        #[arg(long)]
        font: Option<PathBuf>,

        /// Which part to export
        #[arg(long, value_enum, default_value = "all")]
        part: PartSelection,
    },

    /// Print polygon counts, bounds and open edges of every part
    Inspect {
        /// Parameter record (JSON); defaults when omitted
        params: Option<PathBuf>,

        /// TrueType font for lid text
        #[arg(long)]
        font: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the default parameter record as JSON
    Defaults,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PartSelection {
    Box,
    Lid,
    Pins,
    All,
}

impl PartSelection {
    /// The parts this selection exports.
    pub fn kinds(self) -> Vec<PartKind> {
        match self {
            PartSelection::Box => vec![PartKind::Box],
            PartSelection::Lid => vec![PartKind::Lid],
            PartSelection::Pins => vec![PartKind::HingePin],
            PartSelection::All => PartKind::ALL.to_vec(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Loads a parameter record, or the defaults when no path is given.
pub fn load_params(path: Option<&Path>) -> Result<BoxParams> {
    let Some(path) = path else {
        return Ok(BoxParams::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameters from {}", path.display()))?;
    BoxParams::from_json(&json)
        .with_context(|| format!("Failed to parse parameters in {}", path.display()))
}

/// Builds the text rasterizer, loading `font` if given.
pub fn load_rasterizer(font: Option<&Path>) -> Result<TextRasterizer> {
    match font {
        Some(path) => TextRasterizer::from_ttf_file(path)
            .with_context(|| format!("Failed to load font {}", path.display())),
        None => Ok(TextRasterizer::builtin()),
    }
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8) {
    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "boxgen_mesh=info",
            2 => "boxgen_mesh=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Generate {
            params,
            out_dir,
            font,
            part,
        } => generate::run(params.as_deref(), out_dir, font.as_deref(), *part),
        Commands::Inspect {
            params,
            font,
            format,
        } => inspect::run(params.as_deref(), font.as_deref(), *format),
        Commands::Defaults => defaults::run(),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        for cause in e.chain().skip(1) {
            eprintln!("  Caused by: {cause}");
        }
        std::process::exit(1);
    }
}
