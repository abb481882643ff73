use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "calltag", about = "Call-site hash tags for SQL queries", version)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress human-readable output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate the dispatch table for a crate
    Generate {
        /// Crate root (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Output file, overriding calltag.toml
        #[arg(long)]
        out: Option<PathBuf>,

        /// Fail if the generated file is missing or out of date instead of writing it
        #[arg(long)]
        check: bool,
    },

    /// List the marker call sites of a crate with their keys and tags
    Scan {
        /// Crate root (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Print the hash tag of location keys
    Hash {
        /// Location keys such as `orders.list:L12`
        #[arg(required = true)]
        keys: Vec<String>,
    },
}
