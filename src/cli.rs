use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Verbosity levels for diagnostic logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show fatal errors
    Quiet,
    /// Show warnings and errors
    #[default]
    Normal,
    /// Show each validation step and every schema violation
    Verbose,
}

impl VerbosityLevel {
    /// Default `tracing` filter directive when `RUST_LOG` is unset
    pub fn log_directive(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "debug",
        }
    }
}

/// Check sample_herds.xml against herds.xsd
#[derive(Parser, Debug, Clone)]
#[command(name = "validate-herds")]
#[command(
    about = "Validate sample_herds.xml against the herds.xsd schema in the current directory"
)]
#[command(version)]
pub struct Cli {
    /// Log each validation step and schema violation to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Only log fatal errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
