//! Command-line arguments of the `argot` inspection binary.

use argot::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and exercise a declarative CLI schema.
#[derive(Parser, Debug)]
#[command(name = "argot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Schema file path
    #[arg(long, value_name = "PATH", env = "ARGOT_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub mode: Mode,
}

/// What to do with the schema.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Validate the schema and exit
    Check,

    /// Parse tokens and print the resulting context as JSON
    Parse {
        /// Tokens to parse, after `--`
        #[arg(last = true, value_name = "TOKENS")]
        tokens: Vec<String>,
    },

    /// Run tokens through the full interceptor chain
    Run {
        /// Tokens to run, after `--`
        #[arg(last = true, value_name = "TOKENS")]
        tokens: Vec<String>,
    },
}

impl Cli {
    /// Parses CLI arguments from the environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the schema path (from CLI or default location).
    pub fn schema_path(&self) -> PathBuf {
        self.schema.clone().unwrap_or_else(Config::default_path)
    }
}
