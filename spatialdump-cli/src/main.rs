//! spatialdump CLI
//!
//! Renders a spatial tree debug dump to a PNG image.

mod error;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use spatialdump::config::{DEFAULT_INPUT, DEFAULT_OUTPUT};
use spatialdump::dump::Dialect;
use spatialdump::logging::init_logging;
use spatialdump::pipeline::{run, PipelineOptions};

use error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DialectArg {
    /// Detect from the first byte of the dump
    Auto,
    /// Depth, leaf count, point list and line list
    Tree,
    /// Leaf rectangles
    Leaves,
}

impl DialectArg {
    fn resolve(self) -> Option<Dialect> {
        match self {
            DialectArg::Auto => None,
            DialectArg::Tree => Some(Dialect::Tree),
            DialectArg::Leaves => Some(Dialect::Leaves),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "spatialdump")]
#[command(version = spatialdump::VERSION)]
#[command(about = "Render spatial tree debug dumps to PNG", long_about = None)]
struct Args {
    /// Dump to read
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// PNG to write
    #[arg(default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Dump dialect
    #[arg(long, value_enum, default_value = "auto")]
    dialect: DialectArg,

    /// INI config file (default: built-in settings)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print counts instead of rendering
    #[arg(long)]
    summary: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> PipelineOptions {
        PipelineOptions {
            input: self.input.clone(),
            output: self.output.clone(),
            dialect: self.dialect.resolve(),
            config: self.config.clone(),
            summary_only: self.summary,
        }
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = execute(&args) {
        e.exit();
    }
}

fn execute(args: &Args) -> Result<(), CliError> {
    let _logging_guard =
        init_logging(args.verbose).map_err(|e| CliError::LoggingInit(e.to_string()))?;
    tracing::debug!(version = spatialdump::VERSION, ?args, "Starting");

    let summary = run(&args.options())?;
    if args.summary {
        print!("{}", summary);
    }
    Ok(())
}
