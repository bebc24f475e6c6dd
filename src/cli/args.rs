//! CLI argument definitions using clap
//!
//! Commands:
//! - apifilter validate --shape <path> --query <qs>
//! - apifilter query --shape <path> --records <path> --query <qs>
//! - apifilter sql --shape <path> --query <qs> [--table <name>]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// apifilter - typed filtering, sorting and paging for string-based queries
#[derive(Parser, Debug)]
#[command(name = "apifilter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Shape definition file (one shape or an array of shapes)
    #[arg(long)]
    pub shape: PathBuf,

    /// Model shape name; optional when the file holds a single shape
    #[arg(long)]
    pub model: Option<String>,

    /// Entity shape name for the remote stage; defaults to the model's backing fields
    #[arg(long)]
    pub entity: Option<String>,

    /// Query string, e.g. "status=Active&sort=-created&take=10"
    #[arg(long, default_value = "")]
    pub query: String,

    /// Path to a JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Upper bound for take
    #[arg(long)]
    pub max_take: Option<usize>,

    /// chrono format of date filter values
    #[arg(long)]
    pub date_format: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a query string against a shape
    Validate {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Run a query string over a JSON array of records
    Query {
        #[command(flatten)]
        request: RequestArgs,

        /// JSON file holding an array of entity records
        #[arg(long)]
        records: PathBuf,
    },

    /// Print the SQL pushed down for a query string
    Sql {
        #[command(flatten)]
        request: RequestArgs,

        /// Table name; defaults to the entity shape name
        #[arg(long)]
        table: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
