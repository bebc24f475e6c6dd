//! CLI module for apifilter
//!
//! Provides command-line interface for:
//! - validate: pre-flight check of a query string
//! - query: run both stages over a JSON records file
//! - sql: show the pushed-down SELECT

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, RequestArgs};
pub use commands::{query, run, run_command, sql, validate};
pub use errors::{CliError, CliResult};
pub use io::{read_json_file, write_error, write_response};
