//! Clap derive structures for the `ncmdump` CLI.
//!
//! Every setting flag is optional here; defaults live in the config layer
//! so a TOML file or `NCMDUMP_*` variable can supply them instead.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use ncmdump_core::ExtractionMode;

/// ncmdump -- pull device configurations out of an Orion NCM console
#[derive(Debug, Parser)]
#[allow(clippy::struct_excessive_bools)]
#[command(
    name = "ncmdump",
    version,
    about = "Dump device configurations from a SolarWinds Orion NCM console",
    long_about = "Logs in to an Orion NCM web console, lists the managed nodes and \
        retrieves the most recent stored configuration of each one.\n\n\
        Configurations are streamed to stdout, or written to <name>.ncm files \
        with --export. Progress goes to stderr."
)]
pub struct Cli {
    // ── Console ──────────────────────────────────────────────────────
    /// Console address (IP or hostname)
    #[arg(long = "ip", short = 'i', visible_alias = "address", value_name = "HOST")]
    pub address: Option<String>,

    /// TCP port of the web console
    #[arg(long)]
    pub port: Option<u16>,

    /// Connect over HTTPS (certificates are not verified)
    #[arg(long)]
    pub tls: bool,

    /// Console username [default: guest]
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Console password
    #[arg(long, short = 'p', conflicts_with = "ask_password")]
    pub password: Option<String>,

    /// Prompt for the password instead of passing it on the command line
    #[arg(long)]
    pub ask_password: bool,

    // ── Retrieval ────────────────────────────────────────────────────
    /// Page used to read configurations [default: edit]
    #[arg(long, short = 'm', value_enum)]
    pub method: Option<Method>,

    /// Write each configuration to <output-dir>/<name>.ncm instead of stdout
    #[arg(long, short = 'e')]
    pub export: bool,

    /// Directory for exported files [default: .]
    #[arg(long, short = 'd', value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// List the node inventory and exit without retrieving configurations
    #[arg(long, conflicts_with = "export")]
    pub list: bool,

    /// Nodes requested in the single inventory page [default: 1000]
    #[arg(long, value_name = "N")]
    pub page_size: Option<u32>,

    /// User-Agent header sent with every request [default: "NCM Dump"]
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (no timeout when unset)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Configuration file (defaults to the platform config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // ── Output ───────────────────────────────────────────────────────
    /// Format for --list and the exported run report
    #[arg(long, short = 'o', default_value = "table")]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto")]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

// ── Value enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// EditConfig.aspx (default)
    Edit,
    /// ConfigExporter.ashx
    Export,
}

impl From<Method> for ExtractionMode {
    fn from(method: Method) -> Self {
        match method {
            Method::Edit => Self::Edit,
            Method::Export => Self::Export,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table
    Table,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if stderr is a terminal)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn short_flags_match_the_classic_invocation() {
        let cli = Cli::try_parse_from([
            "ncmdump", "-i", "10.0.0.5", "-u", "admin", "-p", "pw", "-m", "export", "-e",
        ])
        .unwrap();
        assert_eq!(cli.address.as_deref(), Some("10.0.0.5"));
        assert_eq!(cli.username.as_deref(), Some("admin"));
        assert_eq!(cli.method, Some(Method::Export));
        assert!(cli.export);
        assert!(!cli.tls);
    }

    #[test]
    fn list_and_export_conflict() {
        assert!(Cli::try_parse_from(["ncmdump", "--list", "--export"]).is_err());
    }
}
