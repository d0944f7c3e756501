use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use j2cov::cli;

/// j2cov — Convert JaCoCo XML coverage reports to Cobertura format.
#[derive(Parser)]
#[command(name = "j2cov", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JaCoCo XML report to a Cobertura XML report.
    Convert {
        /// Path to the JaCoCo XML report.
        input: PathBuf,

        /// Output path (default: cobertura-<input-stem>.xml next to the input).
        #[arg(long)]
        output: Option<PathBuf>,

        /// Source directory to scan when resolving the Cobertura sources
        /// list. May be given multiple times.
        #[arg(long = "source-dir")]
        source_dirs: Vec<PathBuf>,

        /// Root package prefix to strip from class file paths
        /// (e.g. com.example).
        #[arg(long)]
        root_package: Option<String>,

        /// Write one Cobertura report per package instead of a combined one.
        #[arg(long)]
        split_by_package: bool,
    },

    /// Print a summary of a JaCoCo XML report.
    Inspect {
        /// Path to the JaCoCo XML report.
        input: PathBuf,

        /// Emit the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let out = match args.command {
        Commands::Convert {
            input,
            output,
            source_dirs,
            root_package,
            split_by_package,
        } => cli::cmd_convert(
            &input,
            output.as_deref(),
            &source_dirs,
            root_package.as_deref(),
            split_by_package,
        )?,
        Commands::Inspect { input, json } => cli::cmd_inspect(&input, json)?,
    };
    print!("{out}");
    Ok(())
}
