mod options;

use clap::{Parser, Subcommand};
pub use options::{ColorMode, OutputFormat};
use std::path::PathBuf;

/// Encode, decode, check and apply memo filter expressions
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "MEMO_FILTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to use colors
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a JSON filter list into a URL-safe filter string
    Encode {
        /// File holding the filter list, stdin when omitted or "-"
        file: Option<PathBuf>,

        /// Read the saved query format ({"type", "value": {"operator", "value"}, "relation"})
        #[arg(long)]
        saved: bool,

        /// Print a complete "name=value" query parameter
        #[arg(long)]
        param: bool,
    },
    /// Decode a filter string and list its entries
    Decode {
        /// Encoded filter string, or a URL query string with --url
        query: String,

        /// Treat the input as a URL query string and read the filter parameter
        #[arg(long)]
        url: bool,
    },
    /// Decode a filter string and validate every entry
    Check {
        /// Encoded filter string
        query: String,
    },
    /// Filter a memo file (JSON array or JSON lines)
    Apply {
        /// Encoded filter string
        #[arg(short, long)]
        filter: String,

        /// Memo file
        memos: PathBuf,
    },
    /// Compile a filter string into a memo service filter expression
    Expr {
        /// Encoded filter string
        query: String,
    },
}

impl Cli {
    /// Default log directive derived from -q / -v
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
