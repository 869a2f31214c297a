//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// NDDF dual-model shadow price and marginal abatement cost calculator.
#[derive(Debug, Parser)]
#[command(name = "nddf", version, about)]
pub struct Cli {
    /// Path to an application config file (TOML). Defaults apply when
    /// omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API server.
    Serve {
        /// Bind address, overriding the config file.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Solve a panel from a workbook and export the results.
    Compute {
        /// Input workbook (.xlsx or .xls).
        #[arg(long)]
        input: PathBuf,
        /// Model configuration file (TOML, wire-format field names).
        #[arg(long)]
        model: PathBuf,
        /// Worksheet to read; defaults to the first sheet.
        #[arg(long)]
        sheet: Option<String>,
        /// Output workbook path; defaults to NDDF_ShadowPrices_<scale>.xlsx.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
