//! CLI definitions for the `yaconfig` inspection tool.
//!
//! The tool resolves a configuration the same way a library caller would and
//! prints the result, optionally checking folder values on the way.

use crate::config::{DEFAULT_CONFIG_NAME, DEFAULT_FOLDER_KEYWORD};
use crate::format::OutputFormat;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the resolved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FormatArg {
    /// Indented key tree (default)
    #[default]
    Tree,
    /// Pretty-printed JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Tree => OutputFormat::Tree,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Resolve layered YAML configuration and print it
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to search for the config file (repeatable; the first one wins)
    #[arg(short, long = "path", value_name = "DIR")]
    pub paths: Vec<PathBuf>,

    /// Config file name to look for
    #[arg(short, long, default_value = DEFAULT_CONFIG_NAME)]
    pub name: String,

    /// Package directory used to derive default search paths
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Package name for ~/.config/<package>/ (default: base dir name)
    #[arg(long)]
    pub package: Option<String>,

    /// Override a value after resolution, e.g. `--set server.port=8080` (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(String, String)>,

    /// Ignore environment variable overrides
    #[arg(long)]
    pub no_env: bool,

    /// Print only the value at this dotted key path
    #[arg(short, long, value_name = "KEY")]
    pub get: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub format: FormatArg,

    /// Check folder values whose key contains KEYWORD
    #[arg(
        long,
        value_name = "KEYWORD",
        num_args = 0..=1,
        default_missing_value = DEFAULT_FOLDER_KEYWORD
    )]
    pub check_folders: Option<String>,

    /// Create missing folders found by --check-folders
    #[arg(long, requires = "check_folders")]
    pub create: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2")]
    pub log: String,
}

/// Parse `key=value`; the value may itself contain `=`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

/// Split a dotted key into path segments, dropping empty ones.
pub fn key_segments(key: &str) -> Vec<String> {
    key.split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
